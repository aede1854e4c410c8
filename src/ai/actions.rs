//! Page actions backed by the AI collaborator and speech synthesis.
//!
//! Every action reports its own outcome on the document: a modal for
//! request/response actions, progress notices for translation and read
//! aloud. Nothing is returned to the router, which acknowledges the message
//! before the action finishes.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::{
    dom::{Document, NoticeLevel},
    error::LumenError,
    focus::extract_page_content,
    log_error, log_info,
};

use super::{
    read_aloud::{build_utterance, SpeechSynthesizer},
    translate::{
        build_batch_prompt, collect_translatable, parse_batch_response, BATCH_DELAY,
        TRANSLATE_BATCH_SIZE,
    },
    AiAssistant, ImageFetcher,
};

const ENABLE_LOGS: bool = true;

pub const ERROR_TITLE: &str = "Lumen AI Error";
pub const MIN_SUMMARY_CHARS: usize = 100;
pub const MIN_READ_ALOUD_CHARS: usize = 50;

const IMAGE_PROMPT: &str = "You are an expert in accessibility. Describe this image for a \
visually impaired user. Be descriptive but concise. Start with 'Image of...'";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryLength {
    Short,
    Medium,
    Bullet,
}

impl SummaryLength {
    fn instruction(self) -> &'static str {
        match self {
            SummaryLength::Short => "Provide a very concise summary in 2-3 sentences.",
            SummaryLength::Medium => {
                "Provide a comprehensive summary in one paragraph (4-6 sentences)."
            }
            SummaryLength::Bullet => {
                "Provide the key points as a bulleted list (3-5 main points)."
            }
        }
    }
}

#[derive(Clone)]
pub struct AiActions {
    ai: Arc<dyn AiAssistant>,
    images: Arc<dyn ImageFetcher>,
    synth: Arc<dyn SpeechSynthesizer>,
    doc: Arc<Mutex<Document>>,
    translating: Arc<AtomicBool>,
    reading_aloud: Arc<AtomicBool>,
}

impl AiActions {
    pub fn new(
        ai: Arc<dyn AiAssistant>,
        images: Arc<dyn ImageFetcher>,
        synth: Arc<dyn SpeechSynthesizer>,
        doc: Arc<Mutex<Document>>,
    ) -> Self {
        Self {
            ai,
            images,
            synth,
            doc,
            translating: Arc::new(AtomicBool::new(false)),
            reading_aloud: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_translating(&self) -> bool {
        self.translating.load(Ordering::SeqCst)
    }

    pub fn is_reading_aloud(&self) -> bool {
        self.reading_aloud.load(Ordering::SeqCst)
    }

    /// Shows a notice and returns false when no API key is configured.
    async fn ensure_configured(&self) -> bool {
        if self.ai.has_credentials() {
            return true;
        }
        let err = LumenError::Configuration;
        let mut doc = self.doc.lock().await;
        doc.notify(NoticeLevel::Error, err.to_string());
        false
    }

    async fn show(&self, title: &str, body: impl Into<String>) {
        self.doc.lock().await.show_modal(title, body);
    }

    pub async fn run_summarize(&self, text: &str) {
        if !self.ensure_configured().await {
            return;
        }
        self.show("Lumen: AI Summary", "Generating summary...").await;
        match self.ai.summarize_text(text).await {
            Ok(summary) => self.show("Lumen: AI Summary", summary).await,
            Err(err) => {
                let err = LumenError::from(err);
                log_error!("Summarize failed: {err}");
                self.show(ERROR_TITLE, format!("Failed to generate summary. {err}"))
                    .await;
            }
        }
    }

    pub async fn run_simplify(&self, text: &str) {
        if !self.ensure_configured().await {
            return;
        }
        self.show("Lumen: AI Simplification", "Simplifying text...").await;
        match self.ai.simplify_text(text).await {
            Ok(simple) => self.show("Lumen: AI Simplification", simple).await,
            Err(err) => {
                let err = LumenError::from(err);
                log_error!("Simplify failed: {err}");
                self.show(ERROR_TITLE, format!("Failed to simplify text. {err}"))
                    .await;
            }
        }
    }

    pub async fn run_image_description(&self, src_url: &str) {
        if !self.ensure_configured().await {
            return;
        }
        self.show("Lumen: AI Image Description", "Analyzing image...")
            .await;
        match self.describe_image(src_url).await {
            Ok(description) => {
                self.show("Lumen: AI Image Description", description).await
            }
            Err(err) => {
                log_error!("Image description failed for {src_url}: {err}");
                self.show(
                    ERROR_TITLE,
                    format!(
                        "Failed to describe image. {err}. This is often a CORS issue on the source image."
                    ),
                )
                .await;
            }
        }
    }

    async fn describe_image(&self, src_url: &str) -> Result<String, LumenError> {
        let image = self.images.fetch(src_url).await?;
        let description = self
            .ai
            .describe_image(IMAGE_PROMPT, &image.mime_type, &image.base64_data)
            .await?;
        Ok(description)
    }

    pub async fn run_summarize_page(&self, length: SummaryLength) {
        if !self.ensure_configured().await {
            return;
        }
        self.show(
            "Lumen: AI Summarizer",
            "Generating summary... This may take a moment.",
        )
        .await;
        match self.summarize_page(length).await {
            Ok(summary) => self.show("Lumen: Summary Generated", summary).await,
            Err(err) => {
                log_error!("Page summary failed: {err}");
                self.show(ERROR_TITLE, format!("Failed to generate summary: {err}"))
                    .await;
            }
        }
    }

    async fn summarize_page(&self, length: SummaryLength) -> Result<String, LumenError> {
        let content = extract_page_content(self.doc.lock().await.body());
        if content.chars().count() < MIN_SUMMARY_CHARS {
            return Err(LumenError::ContentNotFound(
                "Not enough content found on this page to summarize.".into(),
            ));
        }
        let prompt = format!(
            "You are an expert summarizer. {} Focus on the main ideas and key information. \
             Return only the summary.\n\nCONTENT TO SUMMARIZE:\n{content}",
            length.instruction()
        );
        Ok(self.ai.generate(&prompt).await?)
    }

    /// Translates every eligible text run in place, one batch at a time.
    /// A request made while another translation runs only gets a notice.
    pub async fn run_translate_page(&self, language: &str) {
        if !self.ensure_configured().await {
            return;
        }
        if self.translating.swap(true, Ordering::SeqCst) {
            self.doc
                .lock()
                .await
                .notify(NoticeLevel::Info, "Translation already in progress...");
            return;
        }

        let outcome = self.translate_page(language).await;
        self.translating.store(false, Ordering::SeqCst);

        let mut doc = self.doc.lock().await;
        match outcome {
            Ok(count) => {
                log_info!("Translated {count} text runs to {language}");
                doc.notify(
                    NoticeLevel::Success,
                    format!("Page translated to {language}! ({count} elements translated)"),
                );
            }
            Err(err) => {
                log_error!("Translation failed: {err}");
                doc.notify(NoticeLevel::Error, format!("Translation failed: {err}"));
            }
        }
    }

    async fn translate_page(&self, language: &str) -> Result<usize, LumenError> {
        let runs: Vec<(Vec<usize>, String)> = {
            let mut doc = self.doc.lock().await;
            doc.notify(
                NoticeLevel::Info,
                format!("Translating page to {language}... This may take a moment."),
            );
            let body = doc.body();
            collect_translatable(body)
                .into_iter()
                .filter_map(|path| {
                    let text = body.at_path(&path)?.text.clone();
                    Some((path, text))
                })
                .collect()
        };
        if runs.is_empty() {
            return Err(LumenError::ContentNotFound(
                "No translatable text found on this page.".into(),
            ));
        }

        let batches: Vec<&[(Vec<usize>, String)]> = runs.chunks(TRANSLATE_BATCH_SIZE).collect();
        let mut translated = 0;
        for (batch_index, batch) in batches.iter().enumerate() {
            let percent = batch_index * 100 / batches.len();
            self.doc.lock().await.notify(
                NoticeLevel::Info,
                format!("Translating page to {language}... ({percent}%)"),
            );

            let texts: Vec<String> = batch.iter().map(|(_, text)| text.clone()).collect();
            let reply = self
                .ai
                .translate_blocks(&build_batch_prompt(language, &texts))
                .await?;

            let mut doc = self.doc.lock().await;
            for (index, text) in parse_batch_response(&reply) {
                let Some((path, _)) = batch.get(index) else {
                    continue;
                };
                if let Some(element) = doc.body_mut().at_path_mut(path) {
                    element.text = text;
                    translated += 1;
                }
            }
            drop(doc);

            if batch_index + 1 < batches.len() {
                tokio::time::sleep(BATCH_DELAY).await;
            }
        }
        Ok(translated)
    }

    /// Starts reading the page, or stops when already reading.
    pub async fn run_read_aloud(&self, persona: &str) {
        if self.reading_aloud.swap(false, Ordering::SeqCst) {
            self.synth.cancel();
            self.doc
                .lock()
                .await
                .notify(NoticeLevel::Info, "Reading stopped");
            return;
        }

        let mut doc = self.doc.lock().await;
        match self.start_reading(&doc, persona) {
            Ok(()) => doc.notify(
                NoticeLevel::Info,
                format!("Reading page content with {persona} voice... Click stop in popup to cancel."),
            ),
            Err(err) => {
                log_error!("Read aloud failed: {err}");
                doc.notify(NoticeLevel::Error, format!("Failed to read aloud: {err}"));
            }
        }
    }

    fn start_reading(&self, doc: &Document, persona: &str) -> Result<(), LumenError> {
        let content = extract_page_content(doc.body());
        if content.chars().count() < MIN_READ_ALOUD_CHARS {
            return Err(LumenError::ContentNotFound(
                "Not enough content found on this page to read aloud.".into(),
            ));
        }
        self.synth.cancel();
        let utterance = build_utterance(&content, persona, &self.synth.voices());
        self.synth.speak(utterance).map_err(LumenError::Unsupported)?;
        self.reading_aloud.store(true, Ordering::SeqCst);
        Ok(())
    }

    /// The synthesizer finished (or failed) the current utterance.
    pub async fn reading_finished(&self, success: bool) {
        if !self.reading_aloud.swap(false, Ordering::SeqCst) {
            return;
        }
        let mut doc = self.doc.lock().await;
        if success {
            doc.notify(NoticeLevel::Success, "Finished reading page content");
        } else {
            doc.notify(NoticeLevel::Error, "Error reading aloud");
        }
    }
}

#[cfg(test)]
#[path = "actions_tests.rs"]
mod tests;
