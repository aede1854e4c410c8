//! Page-side dispatcher for messages from the popup and background worker.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::{sync::Mutex, task::JoinHandle};

use crate::{
    features::ToggleKey,
    log_debug, log_warn,
    messages::{HostInput, Message, PageEvent, Response},
    page::PageContext,
};

const ENABLE_LOGS: bool = true;

pub struct PageRouter {
    page: Arc<PageContext>,
    running: Mutex<Vec<JoinHandle<()>>>,
}

impl PageRouter {
    pub fn new(page: Arc<PageContext>) -> Self {
        Self {
            page,
            running: Mutex::new(Vec::new()),
        }
    }

    pub fn page(&self) -> &Arc<PageContext> {
        &self.page
    }

    /// Dispatches one message. Every message is acknowledged, including
    /// ones that fail; AI actions keep running after the reply.
    pub async fn handle(&self, message: Message) -> Response {
        log_debug!("Page message: {}", message.action());
        match message {
            Message::Ping => return Response::ready(),
            Message::GetVoiceStatus => {
                return Response::voice_status(self.page.voice_listening().await)
            }
            Message::ToggleFeature { key, value } => match ToggleKey::parse(&key) {
                Some(toggle) => self.page.set_toggle(&toggle, value).await,
                None => log_warn!("Ignoring toggle for unknown key {key}"),
            },
            Message::AdjustFontSize { value } => {
                self.page.adjust_font_size(value).await;
            }
            Message::AddSkipLink => self.page.add_skip_link().await,
            Message::RunSummarize { text } => {
                let ai = self.page.ai().clone();
                self.spawn(async move { ai.run_summarize(&text).await }).await;
            }
            Message::RunSimplify { text } => {
                let ai = self.page.ai().clone();
                self.spawn(async move { ai.run_simplify(&text).await }).await;
            }
            Message::RunTranslatePage { lang: language }
            | Message::RunAiTranslatePage { language } => {
                let ai = self.page.ai().clone();
                self.spawn(async move { ai.run_translate_page(&language).await })
                    .await;
            }
            Message::RunImageDescription { src_url } => {
                let ai = self.page.ai().clone();
                self.spawn(async move { ai.run_image_description(&src_url).await })
                    .await;
            }
            Message::RunAiSummarizePage { length } => {
                let ai = self.page.ai().clone();
                self.spawn(async move { ai.run_summarize_page(length).await })
                    .await;
            }
            Message::RunAiReadAloud { voice } => {
                let ai = self.page.ai().clone();
                self.spawn(async move { ai.run_read_aloud(&voice).await }).await;
            }
            // Handled by the background worker; nothing to do in the page.
            Message::CloseCurrentTab => {}
        }
        Response::received()
    }

    pub async fn handle_event(&self, event: PageEvent) {
        match event {
            PageEvent::PointerMove { y } => self.page.pointer_moved(y).await,
            PageEvent::Voice { voice } => {
                self.page.voice_event(voice).await;
            }
            PageEvent::FocusExitClicked => self.page.focus_exit_clicked().await,
            PageEvent::SpeechFinished { success } => self.page.speech_finished(success).await,
        }
    }

    /// Parses and dispatches one JSON line. Page events produce no reply.
    pub async fn handle_json(&self, raw: &str) -> Result<Option<Response>> {
        let input: HostInput =
            serde_json::from_str(raw).with_context(|| format!("Unrecognised input: {raw}"))?;
        match input {
            HostInput::Message(message) => Ok(Some(self.handle(message).await)),
            HostInput::Event(event) => {
                self.handle_event(event).await;
                Ok(None)
            }
        }
    }

    /// Waits for every action spawned so far.
    pub async fn drain(&self) {
        let running = std::mem::take(&mut *self.running.lock().await);
        for handle in running {
            if let Err(err) = handle.await {
                log_warn!("Page action task failed: {err}");
            }
        }
    }

    async fn spawn<F>(&self, action: F)
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let mut running = self.running.lock().await;
        running.retain(|handle| !handle.is_finished());
        running.push(tokio::spawn(action));
    }
}
