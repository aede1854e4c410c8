//! AI-assisted content actions and the collaborator they run against.
//!
//! The page core never builds HTTP requests itself. It talks to one
//! [`AiAssistant`] resolved at startup; [`gemini::GeminiClient`] is the
//! production implementation.

pub mod actions;
pub mod gemini;
pub mod image;
pub mod read_aloud;
pub mod translate;

use async_trait::async_trait;
use thiserror::Error;

pub use actions::{AiActions, SummaryLength};
pub use image::{FetchedImage, HttpImageFetcher, ImageFetcher};

#[derive(Debug, Error)]
pub enum AiError {
    #[error("no Gemini API key is configured")]
    MissingApiKey,
    #[error("network error: {0}")]
    Request(String),
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },
    #[error("the model returned no text")]
    EmptyResponse,
    #[error("fetched resource is not an image: {0}")]
    NotAnImage(String),
    #[error("failed to fetch image: {0}")]
    ImageFetch(String),
}

/// Narrow interface to the generative-language backend.
///
/// Implementors provide `generate` and `describe_image`; the text actions
/// are phrased on top of `generate`.
#[async_trait]
pub trait AiAssistant: Send + Sync {
    fn has_credentials(&self) -> bool;

    async fn generate(&self, prompt: &str) -> Result<String, AiError>;

    async fn describe_image(
        &self,
        prompt: &str,
        mime_type: &str,
        base64_data: &str,
    ) -> Result<String, AiError>;

    async fn summarize_text(&self, text: &str) -> Result<String, AiError> {
        self.generate(&format!(
            "Summarize the following text into 3 key bullet points. Be concise and clear.\n\nTEXT:\n\"\"\"{text}\"\"\""
        ))
        .await
    }

    async fn simplify_text(&self, text: &str) -> Result<String, AiError> {
        self.generate(&format!(
            "Rewrite the following text in simple English suitable for a 5th grader. Use short sentences.\n\nTEXT:\n\"\"\"{text}\"\"\""
        ))
        .await
    }

    /// `batch_prompt` already carries the `[i]:: text` blocks; the caller
    /// parses the reply.
    async fn translate_blocks(&self, batch_prompt: &str) -> Result<String, AiError> {
        self.generate(batch_prompt).await
    }
}

/// Stand-in used when no API key is configured: every call reports the
/// missing credential.
#[derive(Debug, Default, Clone, Copy)]
pub struct Unconfigured;

#[async_trait]
impl AiAssistant for Unconfigured {
    fn has_credentials(&self) -> bool {
        false
    }

    async fn generate(&self, _prompt: &str) -> Result<String, AiError> {
        Err(AiError::MissingApiKey)
    }

    async fn describe_image(&self, _: &str, _: &str, _: &str) -> Result<String, AiError> {
        Err(AiError::MissingApiKey)
    }
}
