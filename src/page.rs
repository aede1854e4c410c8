//! The per-page session: one document, one settings store and every feature
//! subsystem wired to them.
//!
//! Lock order is subsystem first (reading guide, voice), then the document.
//! The Pomodoro ticker only ever takes the document lock.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::Mutex;

use crate::{
    ai::{
        read_aloud::{NoSpeechSynthesis, SpeechSynthesizer},
        AiActions, AiAssistant, ImageFetcher, Unconfigured,
    },
    audio::{Chime, SilentChime},
    dom::{Document, Element, NoticeLevel, Selector},
    error::LumenError,
    features::{apply_class_toggle, exclusive_peers, ToggleKey, ToggleTarget},
    focus::FocusMode,
    log_debug, log_error, log_info, log_warn,
    messages::FontAdjust,
    reading_guide::ReadingGuide,
    settings::{SettingsStore, StorageArea, DEFAULT_FONT_SCALE, FONT_SCALE_KEY},
    timer::PomodoroTimer,
    voice::{
        NoSpeechRecognition, RecognizerFactory, VoiceCommand, VoiceControl, VoiceEvent,
        VoiceOutcome, SCROLL_FRACTION,
    },
};

const ENABLE_LOGS: bool = true;

pub const FONT_SCALE_PROPERTY: &str = "--lumen-font-scale";
pub const FONT_SCALE_STEP: f64 = 0.1;
pub const MIN_FONT_SCALE: f64 = 0.8;
pub const MAX_FONT_SCALE: f64 = 2.0;

pub const SKIP_LINK_ID: &str = "lumen-skip-link";
pub const MAIN_CONTENT_ID: &str = "lumen-main-content";
const SKIP_TARGETS: &str = r#"main, [role="main"], article, #content, #main"#;

/// Platform services a page context is built against.
pub struct PageServices {
    pub ai: Arc<dyn AiAssistant>,
    pub images: Arc<dyn ImageFetcher>,
    pub synth: Arc<dyn SpeechSynthesizer>,
    pub recognizers: Arc<dyn RecognizerFactory>,
    pub chime: Arc<dyn Chime>,
}

impl PageServices {
    /// No AI key, no speech and a silent chime. AI actions report the
    /// missing configuration.
    pub fn offline(images: Arc<dyn ImageFetcher>) -> Self {
        Self {
            ai: Arc::new(Unconfigured),
            images,
            synth: Arc::new(NoSpeechSynthesis),
            recognizers: Arc::new(NoSpeechRecognition),
            chime: Arc::new(SilentChime::new()),
        }
    }
}

pub struct PageContext {
    doc: Arc<Mutex<Document>>,
    settings: Arc<SettingsStore>,
    reading_guide: Mutex<ReadingGuide>,
    focus: FocusMode,
    voice: Mutex<VoiceControl>,
    ai: AiActions,
}

impl PageContext {
    pub fn new(doc: Document, settings: Arc<SettingsStore>, services: PageServices) -> Arc<Self> {
        let doc = Arc::new(Mutex::new(doc));
        let timer = PomodoroTimer::new(doc.clone(), services.chime);
        let focus = FocusMode::new(doc.clone(), settings.clone(), timer);
        let ai = AiActions::new(services.ai, services.images, services.synth, doc.clone());

        Arc::new(Self {
            doc,
            settings,
            reading_guide: Mutex::new(ReadingGuide::new()),
            focus,
            voice: Mutex::new(VoiceControl::new(services.recognizers)),
            ai,
        })
    }

    pub fn doc(&self) -> &Arc<Mutex<Document>> {
        &self.doc
    }

    pub fn settings(&self) -> &Arc<SettingsStore> {
        &self.settings
    }

    pub fn focus(&self) -> &FocusMode {
        &self.focus
    }

    pub fn ai(&self) -> &AiActions {
        &self.ai
    }

    /// Re-applies the stored local settings to a freshly loaded page. Focus
    /// mode and voice control are session intents: their flags are reset to
    /// `false` instead of being re-activated. When storage holds more than one
    /// color filter as on, the first in radio order wins and the rest are
    /// written back as off.
    pub async fn initialize(&self) {
        let kept_filter = ToggleKey::COLOR_FILTERS
            .into_iter()
            .find(|filter| self.settings.flag(&filter.storage_key()));

        for (key, value) in self.settings.get_all(StorageArea::Local) {
            if key == FONT_SCALE_KEY {
                let scale = value.as_f64().unwrap_or(DEFAULT_FONT_SCALE);
                self.apply_font_scale(scale).await;
                continue;
            }
            let Some(toggle) = ToggleKey::parse(&key) else {
                continue;
            };
            if toggle.is_session_scoped() {
                self.persist(&toggle, false);
                continue;
            }
            let mut enabled = value.as_bool().unwrap_or(false);
            if let Some(kept) = kept_filter.as_ref().filter(|_| toggle.is_color_filter()) {
                if enabled && *kept != toggle {
                    log_warn!("Dropping {toggle}: {kept} is already on");
                    self.persist(&toggle, false);
                    enabled = false;
                }
            }
            if let Err(err) = self.apply_toggle(&toggle, enabled).await {
                log_warn!("Could not restore {toggle}: {err}");
            }
        }
        log_info!("Page settings restored");
    }

    /// Applies `key` to the page without touching storage.
    pub async fn apply_toggle(&self, key: &ToggleKey, enabled: bool) -> Result<(), LumenError> {
        match key.target() {
            ToggleTarget::RootClass | ToggleTarget::BodyClass => {
                apply_class_toggle(&mut *self.doc.lock().await, key, enabled);
                Ok(())
            }
            ToggleTarget::ReadingGuide => {
                let mut guide = self.reading_guide.lock().await;
                guide.set_enabled(&mut *self.doc.lock().await, enabled);
                Ok(())
            }
            ToggleTarget::FocusMode => self.focus.set_enabled(enabled).await,
            ToggleTarget::VoiceControl => {
                let mut voice = self.voice.lock().await;
                if !enabled {
                    voice.disable();
                    return Ok(());
                }
                voice.enable()
            }
        }
    }

    /// A toggle requested by the popup: switch off exclusive peers, persist,
    /// then apply. Failures are reported on the page, never returned.
    pub async fn set_toggle(&self, key: &ToggleKey, enabled: bool) {
        if enabled {
            for peer in exclusive_peers(key) {
                self.persist(&peer, false);
                if let Err(err) = self.apply_toggle(&peer, false).await {
                    log_warn!("Could not clear {peer}: {err}");
                }
            }
        }
        self.persist(key, enabled);

        match self.apply_toggle(key, enabled).await {
            Ok(()) => log_debug!("{key} -> {enabled}"),
            Err(err) if err.is_silent() => log_debug!("{key} already active"),
            Err(err @ LumenError::Unsupported(_)) => {
                self.doc
                    .lock()
                    .await
                    .notify(NoticeLevel::Error, err.to_string());
            }
            // Focus mode reports its own failures.
            Err(err) => log_warn!("{key} could not be applied: {err}"),
        }
    }

    pub async fn adjust_font_size(&self, direction: FontAdjust) -> f64 {
        let current = self.settings.font_scale();
        let next = match direction {
            FontAdjust::Increase => (current + FONT_SCALE_STEP).min(MAX_FONT_SCALE),
            FontAdjust::Decrease => (current - FONT_SCALE_STEP).max(MIN_FONT_SCALE),
            FontAdjust::Reset => DEFAULT_FONT_SCALE,
        };
        let next = (next * 100.0).round() / 100.0;

        self.apply_font_scale(next).await;
        if let Err(err) = self.settings.set(StorageArea::Local, FONT_SCALE_KEY, next) {
            log_error!("Failed to persist font scale: {err:#}");
        }
        next
    }

    async fn apply_font_scale(&self, scale: f64) {
        self.doc
            .lock()
            .await
            .set_root_style(FONT_SCALE_PROPERTY, format!("{scale:.2}"));
    }

    /// Prepends a "skip to main content" link, or focuses the one already
    /// there.
    pub async fn add_skip_link(&self) {
        let mut doc = self.doc.lock().await;
        if doc.get_element_by_id(SKIP_LINK_ID).is_some() {
            doc.focus(SKIP_LINK_ID);
            return;
        }

        let targets = Selector::parse_group(SKIP_TARGETS);
        let Some(path) = doc.body().query_path(&targets) else {
            doc.notify(
                NoticeLevel::Error,
                "Lumen could not find a \"main\" content area on this page.",
            );
            return;
        };
        let Some(main) = doc.body_mut().at_path_mut(&path) else {
            return;
        };
        let target_id = main
            .id
            .get_or_insert_with(|| MAIN_CONTENT_ID.to_string())
            .clone();

        doc.prepend_to_body(
            Element::new("a")
                .with_id(SKIP_LINK_ID)
                .with_attr("href", &format!("#{target_id}"))
                .with_text("Skip to Main Content"),
        );
        doc.focus(SKIP_LINK_ID);
    }

    pub async fn pointer_moved(&self, client_y: f64) {
        let guide = self.reading_guide.lock().await;
        guide.on_pointer_move(&mut *self.doc.lock().await, client_y);
    }

    pub async fn voice_listening(&self) -> bool {
        self.voice.lock().await.is_listening()
    }

    /// Feeds one recognizer event through the voice state machine and acts on
    /// the outcome.
    pub async fn voice_event(&self, event: VoiceEvent) -> VoiceOutcome {
        let keep_listening = self
            .settings
            .flag(&ToggleKey::VoiceControl.storage_key());
        let outcome = self.voice.lock().await.handle_event(event, keep_listening);

        match &outcome {
            VoiceOutcome::Command(command) => self.execute_command(*command).await,
            VoiceOutcome::PermissionDenied => {
                self.persist(&ToggleKey::VoiceControl, false);
                self.doc
                    .lock()
                    .await
                    .notify(NoticeLevel::Error, LumenError::PermissionDenied.to_string());
            }
            VoiceOutcome::Unmatched(transcript) => {
                log_debug!("No command in \"{transcript}\"");
            }
            VoiceOutcome::Ignored | VoiceOutcome::Restarted | VoiceOutcome::Ended => {}
        }
        outcome
    }

    pub async fn execute_command(&self, command: VoiceCommand) {
        match command {
            VoiceCommand::ScrollDown | VoiceCommand::ScrollUp => {
                let mut doc = self.doc.lock().await;
                let step = doc.viewport_height() * SCROLL_FRACTION;
                let delta = if command == VoiceCommand::ScrollDown {
                    step
                } else {
                    -step
                };
                doc.scroll_by(delta);
            }
            VoiceCommand::GoToTop => self.doc.lock().await.scroll_to(0.0),
            VoiceCommand::GoToBottom => {
                let mut doc = self.doc.lock().await;
                let bottom = doc.scroll_height();
                doc.scroll_to(bottom);
            }
            VoiceCommand::EnterFocusMode => match self.focus.enable().await {
                Ok(()) => self.persist(&ToggleKey::FocusMode, true),
                Err(err) => log_debug!("Voice focus request not applied: {err}"),
            },
            VoiceCommand::ExitFocusMode => self.focus.disable().await,
            VoiceCommand::DisableVoice => {
                self.persist(&ToggleKey::VoiceControl, false);
                self.voice.lock().await.disable();
            }
        }
    }

    pub async fn focus_exit_clicked(&self) {
        self.focus.exit_clicked().await;
    }

    pub async fn speech_finished(&self, success: bool) {
        self.ai.reading_finished(success).await;
    }

    fn persist(&self, key: &ToggleKey, enabled: bool) {
        if let Err(err) = self
            .settings
            .set(StorageArea::Local, &key.storage_key(), Value::Bool(enabled))
        {
            log_error!("Failed to persist {key}: {err:#}");
        }
    }
}

#[cfg(test)]
#[path = "page_tests.rs"]
mod tests;
