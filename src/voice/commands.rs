use serde::Serialize;

/// Fraction of the viewport a spoken scroll moves.
pub const SCROLL_FRACTION: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum VoiceCommand {
    ScrollDown,
    ScrollUp,
    GoToTop,
    GoToBottom,
    EnterFocusMode,
    ExitFocusMode,
    DisableVoice,
}

impl VoiceCommand {
    /// Commands that change a durable flag the popup shows.
    pub fn changes_durable_state(self) -> bool {
        matches!(
            self,
            VoiceCommand::EnterFocusMode | VoiceCommand::ExitFocusMode | VoiceCommand::DisableVoice
        )
    }
}

/// Priority table; the first row with a phrase contained in the transcript
/// wins. "exit focus mode" therefore resolves to `EnterFocusMode`, as the
/// enter aliases are checked first.
const COMMAND_TABLE: [(VoiceCommand, &[&str]); 7] = [
    (VoiceCommand::ScrollDown, &["scroll down"]),
    (VoiceCommand::ScrollUp, &["scroll up"]),
    (VoiceCommand::GoToTop, &["go to top"]),
    (VoiceCommand::GoToBottom, &["go to bottom"]),
    (VoiceCommand::EnterFocusMode, &["focus mode", "reader mode"]),
    (VoiceCommand::ExitFocusMode, &["exit focus", "close reader"]),
    (VoiceCommand::DisableVoice, &["stop listening", "voice off"]),
];

pub fn normalize(transcript: &str) -> String {
    transcript.trim().to_lowercase()
}

/// Maps a normalized transcript to a command.
pub fn interpret(transcript: &str) -> Option<VoiceCommand> {
    COMMAND_TABLE
        .iter()
        .find(|(_, phrases)| phrases.iter().any(|phrase| transcript.contains(phrase)))
        .map(|(command, _)| *command)
}
