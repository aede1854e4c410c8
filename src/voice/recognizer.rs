use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognizerOptions {
    pub continuous: bool,
    pub interim_results: bool,
    pub lang: String,
}

impl Default for RecognizerOptions {
    fn default() -> Self {
        Self {
            continuous: true,
            interim_results: false,
            lang: "en-US".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecognizerError {
    #[error("recognition has already started")]
    AlreadyStarted,
    #[error("recognizer failed: {0}")]
    Platform(String),
}

/// A platform speech-recognition handle.
pub trait SpeechRecognizer: Send {
    fn start(&mut self) -> Result<(), RecognizerError>;
    fn stop(&mut self);
}

/// Builds recognizers; returns `None` when the platform has no speech
/// recognition at all.
pub trait RecognizerFactory: Send + Sync {
    fn create(&self, options: &RecognizerOptions) -> Option<Box<dyn SpeechRecognizer>>;
}

/// Factory for platforms without speech recognition.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSpeechRecognition;

impl RecognizerFactory for NoSpeechRecognition {
    fn create(&self, _options: &RecognizerOptions) -> Option<Box<dyn SpeechRecognizer>> {
        None
    }
}

/// Error codes a recognizer reports through its error event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RecognitionErrorKind {
    NotAllowed,
    ServiceNotAllowed,
    NoSpeech,
    Aborted,
    AudioCapture,
    Network,
    Other(String),
}

impl RecognitionErrorKind {
    pub fn from_code(code: &str) -> Self {
        match code {
            "not-allowed" => Self::NotAllowed,
            "service-not-allowed" => Self::ServiceNotAllowed,
            "no-speech" => Self::NoSpeech,
            "aborted" => Self::Aborted,
            "audio-capture" => Self::AudioCapture,
            "network" => Self::Network,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn code(&self) -> &str {
        match self {
            Self::NotAllowed => "not-allowed",
            Self::ServiceNotAllowed => "service-not-allowed",
            Self::NoSpeech => "no-speech",
            Self::Aborted => "aborted",
            Self::AudioCapture => "audio-capture",
            Self::Network => "network",
            Self::Other(code) => code,
        }
    }

    pub fn is_permission_denial(&self) -> bool {
        matches!(self, Self::NotAllowed | Self::ServiceNotAllowed)
    }
}

impl From<String> for RecognitionErrorKind {
    fn from(code: String) -> Self {
        Self::from_code(&code)
    }
}

impl From<RecognitionErrorKind> for String {
    fn from(kind: RecognitionErrorKind) -> Self {
        kind.code().to_string()
    }
}

/// One recognition result; alternatives are ordered best first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognitionResult {
    pub alternatives: Vec<String>,
}

impl RecognitionResult {
    pub fn single(transcript: &str) -> Self {
        Self {
            alternatives: vec![transcript.to_string()],
        }
    }
}

/// Callbacks of a running recognizer, delivered as events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum VoiceEvent {
    Result { results: Vec<RecognitionResult> },
    Error { error: RecognitionErrorKind },
    End,
}
