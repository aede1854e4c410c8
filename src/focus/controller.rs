use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;

use crate::{
    dom::{Document, Element, NoticeLevel},
    error::LumenError,
    features::ToggleKey,
    log_error, log_info,
    settings::SettingsStore,
    timer::{PomodoroConfig, PomodoroTimer, TIMER_ID},
};

use super::content::locate_main_content;

const ENABLE_LOGS: bool = true;

pub const OVERLAY_ID: &str = "lumen-focus-overlay";
pub const CONTENT_ID: &str = "lumen-focus-content";
pub const TOOLS_ID: &str = "lumen-focus-tools";
pub const CLOSE_ID: &str = "lumen-focus-close";
pub const NO_SCROLL_CLASS: &str = "lumen-no-scroll";

const NOT_FOUND_MESSAGE: &str = "Lumen couldn't find the main content to focus on.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FocusState {
    Inactive,
    Active,
}

/// The one focus session a page may have: what was lifted into the overlay.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusSession {
    pub source_tag: String,
    pub article_chars: usize,
}

/// Reader overlay with its Pomodoro timer.
///
/// The `session` slot is the overlay reference: while it holds a session no
/// second overlay is built. Enable and disable hold its lock for their whole
/// run, timer included, so the slot and the ticker change together.
#[derive(Clone)]
pub struct FocusMode {
    doc: Arc<Mutex<Document>>,
    settings: Arc<SettingsStore>,
    session: Arc<Mutex<Option<FocusSession>>>,
    timer: PomodoroTimer,
}

impl FocusMode {
    pub fn new(doc: Arc<Mutex<Document>>, settings: Arc<SettingsStore>, timer: PomodoroTimer) -> Self {
        Self {
            doc,
            settings,
            session: Arc::new(Mutex::new(None)),
            timer,
        }
    }

    pub async fn state(&self) -> FocusState {
        if self.session.lock().await.is_some() {
            FocusState::Active
        } else {
            FocusState::Inactive
        }
    }

    pub async fn session(&self) -> Option<FocusSession> {
        self.session.lock().await.clone()
    }

    pub fn timer(&self) -> &PomodoroTimer {
        &self.timer
    }

    pub async fn set_enabled(&self, enabled: bool) -> Result<(), LumenError> {
        if enabled {
            self.enable().await
        } else {
            self.disable().await;
            Ok(())
        }
    }

    /// Builds the overlay and starts the timer. Fails with
    /// [`LumenError::ContentNotFound`] after reverting the durable flag and
    /// telling the user; a second call while active is absorbed.
    pub async fn enable(&self) -> Result<(), LumenError> {
        let mut session = self.session.lock().await;
        if session.is_some() {
            return Err(LumenError::AlreadyActive("focus mode"));
        }

        let started = {
            let mut doc = self.doc.lock().await;
            let Some(article) = locate_main_content(doc.body()).cloned() else {
                doc.notify(NoticeLevel::Error, NOT_FOUND_MESSAGE);
                drop(doc);
                self.persist_off();
                return Err(LumenError::ContentNotFound(NOT_FOUND_MESSAGE.to_string()));
            };

            let started = FocusSession {
                source_tag: article.tag.clone(),
                article_chars: article.text_content().chars().count(),
            };
            doc.append_to_body(build_overlay(article));
            doc.toggle_body_class(NO_SCROLL_CLASS, true);
            started
        };

        log_info!(
            "Focus session started on <{}> ({} chars)",
            started.source_tag,
            started.article_chars
        );
        *session = Some(started);

        self.timer
            .start(PomodoroConfig::from_settings(&self.settings))
            .await;
        Ok(())
    }

    /// Tears the overlay down from any state and records the mode as off.
    pub async fn disable(&self) {
        let mut session = self.session.lock().await;
        let ended = session.take();

        {
            let mut doc = self.doc.lock().await;
            doc.remove_element(OVERLAY_ID);
            doc.toggle_body_class(NO_SCROLL_CLASS, false);
        }
        self.timer.cancel().await;
        self.persist_off();

        if let Some(ended) = ended {
            log_info!("Focus session on <{}> ended", ended.source_tag);
        }
    }

    /// The overlay's exit control.
    pub async fn exit_clicked(&self) {
        self.disable().await;
    }

    fn persist_off(&self) {
        if let Err(err) = self
            .settings
            .set_flag(&ToggleKey::FocusMode.storage_key(), false)
        {
            log_error!("Failed to persist focus mode flag: {err:#}");
        }
    }
}

fn build_overlay(article: Element) -> Element {
    let tools = Element::new("div")
        .with_id(TOOLS_ID)
        .with_child(Element::new("div").with_id(TIMER_ID))
        .with_child(
            Element::new("button")
                .with_id(CLOSE_ID)
                .with_text("\u{00d7} Exit Focus"),
        );

    let mut content = Element::new("div").with_id(CONTENT_ID);
    content.text = article.text;
    content.children = article.children;

    Element::new("div")
        .with_id(OVERLAY_ID)
        .with_child(tools)
        .with_child(content)
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;
