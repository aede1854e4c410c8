//! Fixtures and fake platform services shared by the unit tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::{
    ai::{
        read_aloud::{SpeechSynthesizer, SynthVoice, Utterance},
        AiAssistant, AiError, FetchedImage, ImageFetcher,
    },
    dom::{Document, Element},
    voice::{RecognizerError, RecognizerFactory, RecognizerOptions, SpeechRecognizer},
};

pub fn paragraph(text: &str) -> Element {
    Element::new("p").with_text(text)
}

/// A page with navigation chrome and a single article.
pub fn article_page() -> Document {
    let body = Element::new("body")
        .with_child(Element::new("nav").with_id("site-nav").with_text("Home News Contact"))
        .with_child(
            Element::new("article")
                .with_child(Element::new("h1").with_text("Reading is fundamental"))
                .with_child(paragraph(&"Long form reading keeps attention sharp. ".repeat(20)))
                .with_child(paragraph("A closing thought about libraries.")),
        )
        .with_child(Element::new("footer").with_text("Copyright"));
    Document::new(body).with_viewport(800.0, 5000.0)
}

/// A page with nothing but chrome.
pub fn empty_page() -> Document {
    let body = Element::new("body")
        .with_child(Element::new("div").with_class("navbar").with_text("Menu"))
        .with_child(Element::new("div").with_text("Tiny."));
    Document::new(body)
}

#[derive(Debug, Default)]
pub struct RecognizerLog {
    pub created: usize,
    pub starts: usize,
    pub stops: usize,
    pub running: bool,
    pub last_options: Option<RecognizerOptions>,
}

/// Recognizer factory whose handles record into a shared log. A handle
/// refuses a second start while `running` is set, like the browser does.
#[derive(Clone, Default)]
pub struct FakeRecognizers {
    pub log: Arc<Mutex<RecognizerLog>>,
}

impl FakeRecognizers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot<R>(&self, read: impl FnOnce(&RecognizerLog) -> R) -> R {
        read(&self.log.lock().unwrap())
    }

    /// The platform stopped listening on its own (end of utterance).
    pub fn platform_stopped(&self) {
        self.log.lock().unwrap().running = false;
    }
}

struct FakeRecognizer {
    log: Arc<Mutex<RecognizerLog>>,
}

impl SpeechRecognizer for FakeRecognizer {
    fn start(&mut self) -> Result<(), RecognizerError> {
        let mut log = self.log.lock().unwrap();
        if log.running {
            return Err(RecognizerError::AlreadyStarted);
        }
        log.running = true;
        log.starts += 1;
        Ok(())
    }

    fn stop(&mut self) {
        let mut log = self.log.lock().unwrap();
        log.running = false;
        log.stops += 1;
    }
}

impl RecognizerFactory for FakeRecognizers {
    fn create(&self, options: &RecognizerOptions) -> Option<Box<dyn SpeechRecognizer>> {
        let mut log = self.log.lock().unwrap();
        log.created += 1;
        log.last_options = Some(options.clone());
        Some(Box::new(FakeRecognizer {
            log: self.log.clone(),
        }))
    }
}

/// AI backend that echoes prompts back, or fails on demand.
#[derive(Default)]
pub struct FakeAi {
    pub credentials: bool,
    pub fail: bool,
    pub prompts: Mutex<Vec<String>>,
    pub canned: Mutex<Vec<String>>,
}

impl FakeAi {
    pub fn working() -> Self {
        Self {
            credentials: true,
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            credentials: true,
            fail: true,
            ..Self::default()
        }
    }

    pub fn without_key() -> Self {
        Self::default()
    }

    /// Queues responses returned before falling back to echoing.
    pub fn respond_with(self, responses: &[&str]) -> Self {
        *self.canned.lock().unwrap() = responses.iter().rev().map(|s| s.to_string()).collect();
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl AiAssistant for FakeAi {
    fn has_credentials(&self) -> bool {
        self.credentials
    }

    async fn generate(&self, prompt: &str) -> Result<String, AiError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if self.fail {
            return Err(AiError::Api {
                status: 503,
                message: "overloaded".into(),
            });
        }
        if let Some(canned) = self.canned.lock().unwrap().pop() {
            return Ok(canned);
        }
        Ok(format!("echo: {}", prompt.lines().next().unwrap_or_default()))
    }

    async fn describe_image(
        &self,
        prompt: &str,
        mime_type: &str,
        base64_data: &str,
    ) -> Result<String, AiError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if self.fail {
            return Err(AiError::Request("connection reset".into()));
        }
        Ok(format!("Image of {mime_type} ({} bytes)", base64_data.len()))
    }
}

#[derive(Default)]
pub struct FakeImages {
    pub mime_type: String,
}

#[async_trait]
impl ImageFetcher for FakeImages {
    async fn fetch(&self, _src_url: &str) -> Result<FetchedImage, AiError> {
        if !self.mime_type.starts_with("image/") {
            return Err(AiError::NotAnImage(self.mime_type.clone()));
        }
        Ok(FetchedImage {
            mime_type: self.mime_type.clone(),
            base64_data: "aGVsbG8=".into(),
        })
    }
}

#[derive(Default)]
pub struct FakeSynth {
    pub voices: Vec<SynthVoice>,
    pub spoken: Mutex<Vec<Utterance>>,
    pub cancels: Mutex<usize>,
}

impl SpeechSynthesizer for FakeSynth {
    fn voices(&self) -> Vec<SynthVoice> {
        self.voices.clone()
    }

    fn speak(&self, utterance: Utterance) -> Result<(), String> {
        self.spoken.lock().unwrap().push(utterance);
        Ok(())
    }

    fn cancel(&self) {
        *self.cancels.lock().unwrap() += 1;
    }
}
