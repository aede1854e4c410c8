use thiserror::Error;

use crate::ai::AiError;

/// Failures an action can end with. None of them is fatal to the page: each
/// is turned into a notice (or swallowed) by the action that produced it.
#[derive(Debug, Error)]
pub enum LumenError {
    /// No AI credential is configured.
    #[error("Lumen needs a Gemini API key for AI features. Add one in the options page.")]
    Configuration,

    /// Focus mode, page summary or read aloud found nothing worth using.
    #[error("{0}")]
    ContentNotFound(String),

    /// Microphone access was refused.
    #[error("Lumen Voice Control: Please allow microphone access for this site.")]
    PermissionDenied,

    /// The AI backend or the network failed; the user may retry by hand.
    #[error("{0}")]
    Collaborator(String),

    /// A duplicate start on a recognizer, overlay or translation.
    #[error("{0} is already active")]
    AlreadyActive(&'static str),

    /// The platform lacks a capability (speech recognition, speech synthesis).
    #[error("{0}")]
    Unsupported(String),

    #[error("settings storage failed: {0}")]
    Storage(String),
}

impl LumenError {
    /// Errors in this class are absorbed without telling the user.
    pub fn is_silent(&self) -> bool {
        matches!(self, LumenError::AlreadyActive(_))
    }
}

impl From<AiError> for LumenError {
    fn from(err: AiError) -> Self {
        match err {
            AiError::MissingApiKey => LumenError::Configuration,
            other => LumenError::Collaborator(other.to_string()),
        }
    }
}

impl From<anyhow::Error> for LumenError {
    fn from(err: anyhow::Error) -> Self {
        LumenError::Storage(format!("{err:#}"))
    }
}
