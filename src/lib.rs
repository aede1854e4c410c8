pub mod ai;
pub mod audio;
pub mod background;
pub mod config;
pub mod dom;
pub mod error;
pub mod features;
pub mod focus;
pub mod messages;
pub mod page;
pub mod reading_guide;
pub mod router;
pub mod settings;
pub mod timer;
pub mod voice;
mod utils;

#[cfg(test)]
mod test_support;

use std::{path::Path, sync::Arc};

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use ai::{
    gemini::GeminiClient, read_aloud::NoSpeechSynthesis, AiAssistant, HttpImageFetcher,
};
use audio::AlarmPlayer;
use config::HostConfig;
use dom::Document;
use page::{PageContext, PageServices};
use router::PageRouter;
use settings::SettingsStore;
use voice::NoSpeechRecognition;

pub use error::LumenError;
pub use messages::{Message, Response};

/// Runs the page host: one page context fed JSON lines on stdin, replies
/// written as JSON lines on stdout.
pub fn run() -> Result<()> {
    let config = HostConfig::from_env();

    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(config.log_level())
        .init();

    log::info!("Lumen host starting up...");

    let runtime = tokio::runtime::Runtime::new().context("Failed to start the async runtime")?;
    runtime.block_on(run_host(config))
}

async fn run_host(config: HostConfig) -> Result<()> {
    let settings = match &config.settings_path {
        Some(path) => SettingsStore::new(path.clone())?,
        None => SettingsStore::in_memory(),
    };
    if settings.is_first_run() {
        settings.install_defaults()?;
    }

    let doc = match &config.page_path {
        Some(path) => load_page(path)?,
        None => Document::default(),
    };

    let alarm = Arc::new(AlarmPlayer::new());
    let ai: Arc<dyn AiAssistant> = Arc::new(GeminiClient::new(config.gemini_api_key.clone())?);
    if !ai.has_credentials() {
        log::warn!("No Gemini API key configured; AI actions will ask for one");
    }
    let services = PageServices {
        ai,
        images: Arc::new(HttpImageFetcher::new()?),
        synth: Arc::new(NoSpeechSynthesis),
        recognizers: Arc::new(NoSpeechRecognition),
        chime: alarm.clone(),
    };

    let page = PageContext::new(doc, Arc::new(settings), services);
    page.initialize().await;
    let router = PageRouter::new(page);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    while let Some(line) = lines.next_line().await.context("Failed to read input")? {
        if line.trim().is_empty() {
            continue;
        }
        match router.handle_json(&line).await {
            Ok(Some(response)) => {
                let mut encoded = serde_json::to_string(&response)?;
                encoded.push('\n');
                stdout.write_all(encoded.as_bytes()).await?;
                stdout.flush().await?;
            }
            Ok(None) => {}
            Err(err) => log::warn!("{err:#}"),
        }
    }

    router.drain().await;
    alarm.stop();
    log::info!("Input closed, Lumen host shutting down");
    Ok(())
}

fn load_page(path: &Path) -> Result<Document> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read page from {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse page document {}", path.display()))
}
