use super::*;
use crate::{
    settings::{StorageArea, BLOCKED_SITES_KEY},
    test_support::FakeSynth,
};
use std::sync::Mutex;

#[derive(Default)]
struct MockHost {
    content_script_loaded: Mutex<bool>,
    calls: Mutex<Vec<String>>,
    sent: Mutex<Vec<Message>>,
    menu: Mutex<Vec<&'static str>>,
}

impl MockHost {
    fn with_content_script() -> Self {
        let host = Self::default();
        *host.content_script_loaded.lock().unwrap() = true;
        host
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl TabHost for MockHost {
    async fn send_message(&self, tab: TabId, message: &Message) -> Result<Response, ChannelError> {
        if !*self.content_script_loaded.lock().unwrap() {
            return Err(ChannelError::NoReceiver(tab));
        }
        if *message == Message::Ping {
            return Ok(Response::ready());
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(Response::received())
    }

    async fn execute_scripts(&self, tab: TabId, files: &[&str]) -> Result<(), ChannelError> {
        self.record(format!("scripts {tab} {}", files.join(",")));
        *self.content_script_loaded.lock().unwrap() = true;
        Ok(())
    }

    async fn insert_css(&self, tab: TabId, files: &[&str]) -> Result<(), ChannelError> {
        self.record(format!("css {tab} {}", files.join(",")));
        Ok(())
    }

    async fn open_tab(&self, url: &str) -> Result<(), ChannelError> {
        self.record(format!("open {url}"));
        Ok(())
    }

    async fn update_tab_url(&self, tab: TabId, url: &str) -> Result<(), ChannelError> {
        self.record(format!("update {tab} {url}"));
        Ok(())
    }

    async fn remove_tab(&self, tab: TabId) -> Result<(), ChannelError> {
        self.record(format!("remove {tab}"));
        Ok(())
    }

    fn replace_context_menu(&self, items: &[ContextMenuItem]) {
        *self.menu.lock().unwrap() = items.iter().map(|item| item.id).collect();
    }

    fn extension_url(&self, path: &str) -> String {
        format!("chrome-extension://lumen/{path}")
    }
}

struct Setup {
    worker: BackgroundWorker,
    host: Arc<MockHost>,
    settings: Arc<SettingsStore>,
    tts: Arc<FakeSynth>,
}

fn setup(host: MockHost) -> Setup {
    let host = Arc::new(host);
    let settings = Arc::new(SettingsStore::in_memory());
    let tts = Arc::new(FakeSynth::default());
    let worker = BackgroundWorker::new(host.clone(), settings.clone(), tts.clone());
    Setup {
        worker,
        host,
        settings,
        tts,
    }
}

fn tab(id: TabId, url: &str) -> TabInfo {
    TabInfo {
        id: Some(id),
        url: url.to_string(),
    }
}

fn click(id: &str) -> MenuClick {
    MenuClick {
        menu_item_id: id.to_string(),
        ..MenuClick::default()
    }
}

#[test]
fn blocking_matches_hosts_without_www() {
    let sites = vec!["reddit.com".to_string(), "youtube.com".to_string()];
    assert!(is_blocked("https://www.reddit.com/r/rust", &sites));
    assert!(is_blocked("https://old.reddit.com/", &sites));
    assert!(is_blocked("https://m.youtube.com/watch?v=1", &sites));
    assert!(!is_blocked("https://docs.rs/tokio", &sites));
    assert!(!is_blocked("not a url", &sites));
    assert!(!is_blocked("https://example.com", &["".to_string()]));
}

#[tokio::test]
async fn first_install_seeds_defaults_and_menu() {
    let s = setup(MockHost::default());

    s.worker.on_installed(InstallReason::Install).await.unwrap();

    assert_eq!(s.host.calls(), vec![format!("open {ONBOARDING_PAGE}")]);
    assert_eq!(s.settings.blocked_sites().len(), 4);
    assert_eq!(s.settings.pomodoro_minutes(), (25, 5));
    assert_eq!(s.settings.font_scale(), 1.0);
    assert_eq!(s.host.menu.lock().unwrap().len(), 6);
}

#[tokio::test]
async fn updates_keep_existing_settings() {
    let s = setup(MockHost::default());
    s.settings
        .set(StorageArea::Sync, BLOCKED_SITES_KEY, vec!["news.ycombinator.com"])
        .unwrap();

    s.worker.on_installed(InstallReason::Update).await.unwrap();

    assert!(s.host.calls().is_empty());
    assert_eq!(s.settings.blocked_sites(), vec!["news.ycombinator.com".to_string()]);
    assert_eq!(s.host.menu.lock().unwrap()[0], "lumen-describe-image");
}

#[tokio::test(start_paused = true)]
async fn missing_content_script_is_injected_before_relaying() {
    let s = setup(MockHost::default());

    let reply = s
        .worker
        .relay(7, &Message::AddSkipLink)
        .await
        .unwrap();

    assert_eq!(reply, Response::received());
    assert_eq!(
        s.host.calls(),
        vec![
            "scripts 7 gemini-api.js,content.js".to_string(),
            "css 7 assets/css/lumen-inject.css".to_string(),
        ]
    );
    assert_eq!(s.host.sent.lock().unwrap().clone(), vec![Message::AddSkipLink]);
}

#[tokio::test]
async fn live_content_script_is_not_reinjected() {
    let s = setup(MockHost::with_content_script());

    s.worker.ensure_injected(3).await.unwrap();

    assert!(s.host.calls().is_empty());
}

#[tokio::test]
async fn context_menu_items_become_page_messages() {
    let s = setup(MockHost::with_content_script());
    let selection = MenuClick {
        selection_text: Some("dense paragraph".into()),
        ..click("lumen-simplify")
    };

    let sent = s
        .worker
        .on_context_menu(&selection, &tab(1, "https://example.com"))
        .await
        .unwrap();
    assert_eq!(
        sent,
        Some(Message::RunSimplify {
            text: "dense paragraph".into()
        })
    );

    let sent = s
        .worker
        .on_context_menu(&click("lumen-translate-page-fr"), &tab(1, "https://example.com"))
        .await
        .unwrap();
    assert_eq!(
        sent,
        Some(Message::RunTranslatePage {
            lang: "French".into()
        })
    );
}

#[tokio::test]
async fn image_description_needs_a_source() {
    let s = setup(MockHost::with_content_script());

    let sent = s
        .worker
        .on_context_menu(&click("lumen-describe-image"), &tab(1, "https://example.com"))
        .await
        .unwrap();

    assert_eq!(sent, None);
    assert!(s.host.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn protected_pages_are_left_alone() {
    let s = setup(MockHost::default());

    let sent = s
        .worker
        .on_context_menu(&click("lumen-summarize"), &tab(1, "chrome://settings"))
        .await
        .unwrap();

    assert_eq!(sent, None);
    assert!(s.host.calls().is_empty());
}

#[tokio::test]
async fn tts_reads_the_selection_in_the_background() {
    let s = setup(MockHost::with_content_script());

    s.worker
        .on_context_menu(&click("lumen-tts"), &tab(2, "https://example.com"))
        .await
        .unwrap();

    let spoken = s.tts.spoken.lock().unwrap();
    assert_eq!(spoken[0].text, NO_SELECTION);
    assert_eq!(spoken[0].rate, 1.0);
    assert_eq!(*s.tts.cancels.lock().unwrap(), 1);
}

#[tokio::test]
async fn close_request_removes_the_sender_tab() {
    let s = setup(MockHost::default());

    s.worker.on_runtime_message(&Message::CloseCurrentTab, Some(9)).await;
    s.worker.on_runtime_message(&Message::CloseCurrentTab, None).await;
    s.worker.on_runtime_message(&Message::Ping, Some(9)).await;

    assert_eq!(s.host.calls(), vec!["remove 9".to_string()]);
}

#[tokio::test]
async fn loading_blocked_sites_redirects() {
    let s = setup(MockHost::default());
    s.settings.install_defaults().unwrap();

    let blocked = s
        .worker
        .on_tab_updated(4, true, Some("https://www.youtube.com/feed"))
        .await
        .unwrap();
    assert!(blocked);
    assert_eq!(
        s.host.calls(),
        vec!["update 4 chrome-extension://lumen/blocked.html".to_string()]
    );

    let finished_loading = s
        .worker
        .on_tab_updated(4, false, Some("https://www.youtube.com/feed"))
        .await
        .unwrap();
    assert!(!finished_loading);
}

#[tokio::test]
async fn empty_block_list_blocks_nothing() {
    let s = setup(MockHost::default());

    let blocked = s
        .worker
        .on_tab_updated(4, true, Some("https://reddit.com"))
        .await
        .unwrap();

    assert!(!blocked);
    assert!(s.host.calls().is_empty());
}
