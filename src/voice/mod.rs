pub mod commands;
pub mod controller;
pub mod recognizer;

pub use commands::{interpret, normalize, VoiceCommand, SCROLL_FRACTION};
pub use controller::{VoiceControl, VoiceOutcome, VoiceState};
pub use recognizer::{
    NoSpeechRecognition, RecognitionErrorKind, RecognitionResult, RecognizerError,
    RecognizerFactory, RecognizerOptions, SpeechRecognizer, VoiceEvent,
};
