//! The extension's background worker: install-time setup, context-menu
//! relaying, content-script re-injection, distraction blocking and tab
//! closing on request.
//!
//! Browser APIs are reached through [`TabHost`], so the worker itself is plain
//! logic over the settings store.

use std::{sync::Arc, time::Duration};

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::{
    ai::read_aloud::{SpeechSynthesizer, Utterance},
    log_error, log_info, log_warn,
    messages::{Message, Response},
    settings::SettingsStore,
};

const ENABLE_LOGS: bool = true;

pub type TabId = u32;

pub const CONTENT_SCRIPTS: [&str; 2] = ["gemini-api.js", "content.js"];
pub const CONTENT_STYLES: [&str; 1] = ["assets/css/lumen-inject.css"];
pub const ONBOARDING_PAGE: &str = "onboarding/onboarding.html";
pub const BLOCKED_PAGE: &str = "blocked.html";
/// Time given to freshly injected scripts before the first message.
pub const INJECTION_SETTLE: Duration = Duration::from_millis(500);

const PROTECTED_SCHEME: &str = "chrome://";
const NO_SELECTION: &str = "No text selected.";

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("no content script is listening in tab {0}")]
    NoReceiver(TabId),
    #[error("tab host error: {0}")]
    Host(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MenuContext {
    Image,
    Selection,
    All,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContextMenuItem {
    pub id: &'static str,
    pub title: &'static str,
    pub contexts: Vec<MenuContext>,
}

pub fn context_menu() -> Vec<ContextMenuItem> {
    let item = |id, title, context| ContextMenuItem {
        id,
        title,
        contexts: vec![context],
    };
    vec![
        item(
            "lumen-describe-image",
            "Lumen: Describe this image (AI)",
            MenuContext::Image,
        ),
        item(
            "lumen-summarize",
            "Lumen: Summarize selected text (AI)",
            MenuContext::Selection,
        ),
        item(
            "lumen-simplify",
            "Lumen: Simplify selected text (AI)",
            MenuContext::Selection,
        ),
        item(
            "lumen-translate-page-es",
            "Lumen: Translate entire page to Spanish (AI)",
            MenuContext::All,
        ),
        item(
            "lumen-translate-page-fr",
            "Lumen: Translate entire page to French (AI)",
            MenuContext::All,
        ),
        item(
            "lumen-tts",
            "Lumen: Read selected text (Browser TTS)",
            MenuContext::Selection,
        ),
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallReason {
    Install,
    Update,
    ChromeUpdate,
    SharedModuleUpdate,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuClick {
    pub menu_item_id: String,
    #[serde(default)]
    pub selection_text: Option<String>,
    #[serde(default)]
    pub src_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabInfo {
    pub id: Option<TabId>,
    pub url: String,
}

/// The browser surface the background worker drives.
#[async_trait]
pub trait TabHost: Send + Sync {
    async fn send_message(&self, tab: TabId, message: &Message) -> Result<Response, ChannelError>;
    async fn execute_scripts(&self, tab: TabId, files: &[&str]) -> Result<(), ChannelError>;
    async fn insert_css(&self, tab: TabId, files: &[&str]) -> Result<(), ChannelError>;
    async fn open_tab(&self, url: &str) -> Result<(), ChannelError>;
    async fn update_tab_url(&self, tab: TabId, url: &str) -> Result<(), ChannelError>;
    async fn remove_tab(&self, tab: TabId) -> Result<(), ChannelError>;
    /// Replaces every context-menu entry the extension owns.
    fn replace_context_menu(&self, items: &[ContextMenuItem]);
    fn extension_url(&self, path: &str) -> String;
}

pub struct BackgroundWorker {
    host: Arc<dyn TabHost>,
    settings: Arc<SettingsStore>,
    tts: Arc<dyn SpeechSynthesizer>,
    settle_delay: Duration,
}

impl BackgroundWorker {
    pub fn new(
        host: Arc<dyn TabHost>,
        settings: Arc<SettingsStore>,
        tts: Arc<dyn SpeechSynthesizer>,
    ) -> Self {
        Self {
            host,
            settings,
            tts,
            settle_delay: INJECTION_SETTLE,
        }
    }

    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// First install seeds defaults and opens onboarding; every install
    /// event rebuilds the context menu.
    pub async fn on_installed(&self, reason: InstallReason) -> Result<()> {
        if reason == InstallReason::Install {
            if let Err(err) = self.host.open_tab(ONBOARDING_PAGE).await {
                log_warn!("Could not open onboarding: {err}");
            }
            self.settings.install_defaults()?;
            log_info!("Installed default settings");
        }
        self.host.replace_context_menu(&context_menu());
        Ok(())
    }

    /// Pings the tab and injects the content scripts and stylesheet when
    /// nothing answers.
    pub async fn ensure_injected(&self, tab: TabId) -> Result<(), ChannelError> {
        if self.host.send_message(tab, &Message::Ping).await.is_ok() {
            return Ok(());
        }
        log_info!("Content script not found in tab {tab}, injecting");
        self.host.execute_scripts(tab, &CONTENT_SCRIPTS).await?;
        self.host.insert_css(tab, &CONTENT_STYLES).await?;
        tokio::time::sleep(self.settle_delay).await;
        Ok(())
    }

    /// Delivers `message` to the page, injecting the content script first
    /// when needed.
    pub async fn relay(&self, tab: TabId, message: &Message) -> Result<Response, ChannelError> {
        self.ensure_injected(tab).await?;
        self.host.send_message(tab, message).await
    }

    /// Turns a context-menu click into a page message. Returns the message
    /// sent, if any.
    pub async fn on_context_menu(
        &self,
        click: &MenuClick,
        tab: &TabInfo,
    ) -> Result<Option<Message>, ChannelError> {
        let Some(tab_id) = tab.id else {
            return Ok(None);
        };
        if tab.url.starts_with(PROTECTED_SCHEME) {
            log_info!("Cannot inject script on protected page {}", tab.url);
            return Ok(None);
        }

        self.ensure_injected(tab_id).await?;

        let selection = click.selection_text.clone();
        let message = match click.menu_item_id.as_str() {
            "lumen-tts" => {
                self.speak_selection(selection.as_deref());
                return Ok(None);
            }
            "lumen-summarize" => Message::RunSummarize {
                text: selection.unwrap_or_default(),
            },
            "lumen-simplify" => Message::RunSimplify {
                text: selection.unwrap_or_default(),
            },
            "lumen-translate-page-es" => Message::RunTranslatePage {
                lang: "Spanish".into(),
            },
            "lumen-translate-page-fr" => Message::RunTranslatePage {
                lang: "French".into(),
            },
            "lumen-describe-image" => match &click.src_url {
                Some(src_url) => Message::RunImageDescription {
                    src_url: src_url.clone(),
                },
                None => return Ok(None),
            },
            other => {
                log_warn!("Unknown context menu item {other}");
                return Ok(None);
            }
        };

        self.host.send_message(tab_id, &message).await?;
        Ok(Some(message))
    }

    fn speak_selection(&self, selection: Option<&str>) {
        self.tts.cancel();
        let utterance = Utterance {
            text: selection.unwrap_or(NO_SELECTION).to_string(),
            rate: 1.0,
            pitch: 1.0,
            volume: 1.0,
            voice: None,
        };
        if let Err(err) = self.tts.speak(utterance) {
            log_error!("Browser TTS failed: {err}");
        }
    }

    /// Messages addressed to the background worker itself.
    pub async fn on_runtime_message(&self, message: &Message, sender_tab: Option<TabId>) {
        if let (Message::CloseCurrentTab, Some(tab)) = (message, sender_tab) {
            if let Err(err) = self.host.remove_tab(tab).await {
                log_error!("Could not close tab {tab}: {err}");
            }
        }
    }

    /// Redirects a loading tab to the blocked page when its host is on the
    /// block list. Returns whether it did.
    pub async fn on_tab_updated(
        &self,
        tab: TabId,
        loading: bool,
        url: Option<&str>,
    ) -> Result<bool, ChannelError> {
        let Some(url) = url.filter(|_| loading) else {
            return Ok(false);
        };
        let sites = self.settings.blocked_sites();
        if !is_blocked(url, &sites) {
            return Ok(false);
        }
        log_info!("Blocking distracting site {url}");
        let target = self.host.extension_url(BLOCKED_PAGE);
        self.host.update_tab_url(tab, &target).await?;
        Ok(true)
    }
}

/// True when the URL's host, minus a leading `www.`, contains any entry of
/// the block list. Unparseable URLs and hostless ones are never blocked.
pub fn is_blocked(url: &str, blocked_sites: &[String]) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };
    let Some(host) = parsed.host_str() else {
        return false;
    };
    let host = host.strip_prefix("www.").unwrap_or(host);
    blocked_sites
        .iter()
        .filter(|site| !site.is_empty())
        .any(|site| host.contains(site.as_str()))
}

#[cfg(test)]
#[path = "background_tests.rs"]
mod tests;
