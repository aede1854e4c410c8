fn main() -> anyhow::Result<()> {
    lumen_lib::run()
}
