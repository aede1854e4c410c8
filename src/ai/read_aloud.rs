//! Speech synthesis for reading the page aloud.

/// Characters of page text handed to the synthesizer in one utterance.
pub const READ_ALOUD_LIMIT: usize = 2000;
pub const READ_ALOUD_RATE: f32 = 0.8;
pub const DEFAULT_VOICE: &str = "Kore";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthVoice {
    pub name: String,
    pub lang: String,
}

impl SynthVoice {
    pub fn new(name: &str, lang: &str) -> Self {
        Self {
            name: name.to_string(),
            lang: lang.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
    /// Name of the platform voice, `None` for the platform default.
    pub voice: Option<String>,
}

/// Platform text-to-speech engine.
pub trait SpeechSynthesizer: Send + Sync {
    fn voices(&self) -> Vec<SynthVoice>;
    fn speak(&self, utterance: Utterance) -> Result<(), String>;
    fn cancel(&self);
}

/// Used where the platform has no speech synthesis.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSpeechSynthesis;

impl SpeechSynthesizer for NoSpeechSynthesis {
    fn voices(&self) -> Vec<SynthVoice> {
        Vec::new()
    }

    fn speak(&self, _utterance: Utterance) -> Result<(), String> {
        Err("Text-to-speech is not supported by your browser.".to_string())
    }

    fn cancel(&self) {}
}

/// Name and language fragments that suggest a platform voice matches one of
/// the voice personas offered in the popup. Unknown personas use Kore's.
pub fn voice_hints(persona: &str) -> &'static [&'static str] {
    match persona {
        "Puck" => &["male", "english", "us", "alex", "daniel"],
        "Zephyr" => &["female", "english", "uk", "victoria", "kate"],
        "Charon" => &["male", "english", "us", "fred", "thomas"],
        _ => &["female", "google", "english", "karen", "samantha"],
    }
}

/// First voice whose name or language contains a hint, else the first voice.
pub fn pick_voice<'a>(voices: &'a [SynthVoice], persona: &str) -> Option<&'a SynthVoice> {
    let hints = voice_hints(persona);
    voices
        .iter()
        .find(|voice| {
            let name = voice.name.to_lowercase();
            let lang = voice.lang.to_lowercase();
            hints.iter().any(|hint| name.contains(hint) || lang.contains(hint))
        })
        .or_else(|| voices.first())
}

pub fn build_utterance(content: &str, persona: &str, voices: &[SynthVoice]) -> Utterance {
    Utterance {
        text: content.chars().take(READ_ALOUD_LIMIT).collect(),
        rate: READ_ALOUD_RATE,
        pitch: 1.0,
        volume: 1.0,
        voice: pick_voice(voices, persona).map(|voice| voice.name.clone()),
    }
}
