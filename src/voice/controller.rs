use std::sync::Arc;

use serde::Serialize;

use crate::{error::LumenError, log_debug, log_info, log_warn};

use super::{
    commands::{interpret, normalize, VoiceCommand},
    recognizer::{RecognizerError, RecognizerFactory, RecognizerOptions, SpeechRecognizer, VoiceEvent},
};

const ENABLE_LOGS: bool = true;

const UNSUPPORTED_MESSAGE: &str = "Speech Recognition is not supported by your browser.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum VoiceState {
    Disabled,
    Enabled,
}

/// What a recognizer event led to; the page context acts on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceOutcome {
    /// Nothing to do (no handle, empty result, benign error).
    Ignored,
    Command(VoiceCommand),
    Unmatched(String),
    /// Microphone refused; the handle has been released.
    PermissionDenied,
    /// The recognizer stopped and was started again.
    Restarted,
    /// The recognizer stopped and the durable flag says to stay stopped.
    Ended,
}

/// Continuous speech recognition session.
///
/// The handle is created on the first enable and kept across start/stop
/// cycles so the end-of-utterance event can restart it. Only an explicit
/// disable (or a permission denial) releases it, which is what makes a late
/// `End` after disable a no-op.
pub struct VoiceControl {
    factory: Arc<dyn RecognizerFactory>,
    options: RecognizerOptions,
    recognizer: Option<Box<dyn SpeechRecognizer>>,
}

impl VoiceControl {
    pub fn new(factory: Arc<dyn RecognizerFactory>) -> Self {
        Self {
            factory,
            options: RecognizerOptions::default(),
            recognizer: None,
        }
    }

    pub fn state(&self) -> VoiceState {
        if self.recognizer.is_some() {
            VoiceState::Enabled
        } else {
            VoiceState::Disabled
        }
    }

    pub fn is_listening(&self) -> bool {
        self.recognizer.is_some()
    }

    pub fn enable(&mut self) -> Result<(), LumenError> {
        if self.recognizer.is_none() {
            let created = self
                .factory
                .create(&self.options)
                .ok_or_else(|| LumenError::Unsupported(UNSUPPORTED_MESSAGE.to_string()))?;
            log_info!("Speech recognizer created ({})", self.options.lang);
            self.recognizer = Some(created);
        }

        if let Some(recognizer) = self.recognizer.as_mut() {
            start_quietly(recognizer.as_mut());
        }
        Ok(())
    }

    pub fn disable(&mut self) {
        if let Some(mut recognizer) = self.recognizer.take() {
            recognizer.stop();
            log_info!("Speech recognizer released");
        }
    }

    /// Applies one recognizer event. `keep_listening` is the durable
    /// voice-control flag as currently stored.
    pub fn handle_event(&mut self, event: VoiceEvent, keep_listening: bool) -> VoiceOutcome {
        let Some(recognizer) = self.recognizer.as_mut() else {
            log_debug!("Dropping {:?} for a released recognizer", event);
            return VoiceOutcome::Ignored;
        };

        match event {
            VoiceEvent::Result { results } => {
                let Some(best) = results.last().and_then(|r| r.alternatives.first()) else {
                    return VoiceOutcome::Ignored;
                };
                let transcript = normalize(best);
                log_info!("Voice command: {transcript}");
                match interpret(&transcript) {
                    Some(command) => VoiceOutcome::Command(command),
                    None => VoiceOutcome::Unmatched(transcript),
                }
            }
            VoiceEvent::Error { error } if error.is_permission_denial() => {
                log_warn!("Microphone access denied ({})", error.code());
                if let Some(mut released) = self.recognizer.take() {
                    released.stop();
                }
                VoiceOutcome::PermissionDenied
            }
            VoiceEvent::Error { error } => {
                log_warn!("Voice recognition error: {}", error.code());
                VoiceOutcome::Ignored
            }
            VoiceEvent::End if keep_listening => {
                start_quietly(recognizer.as_mut());
                VoiceOutcome::Restarted
            }
            VoiceEvent::End => VoiceOutcome::Ended,
        }
    }
}

fn start_quietly(recognizer: &mut dyn SpeechRecognizer) {
    match recognizer.start() {
        Ok(()) | Err(RecognizerError::AlreadyStarted) => {}
        Err(err) => log_warn!("Could not start recognizer: {err}"),
    }
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;
