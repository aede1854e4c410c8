//! Wire format shared by the popup, the background worker and the page.
//!
//! Messages are JSON objects tagged by their `action` field, e.g.
//! `{"action":"toggleFeature","key":"lumen-dyslexia","value":true}`.

use serde::{Deserialize, Serialize};

use crate::{ai::SummaryLength, voice::VoiceEvent};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Message {
    Ping,
    ToggleFeature {
        key: String,
        value: bool,
    },
    AdjustFontSize {
        value: FontAdjust,
    },
    AddSkipLink,
    RunSummarize {
        text: String,
    },
    RunSimplify {
        text: String,
    },
    RunTranslatePage {
        lang: String,
    },
    RunImageDescription {
        #[serde(rename = "srcUrl")]
        src_url: String,
    },
    #[serde(rename = "runAITranslatePage")]
    RunAiTranslatePage {
        language: String,
    },
    #[serde(rename = "runAISummarizePage")]
    RunAiSummarizePage {
        length: SummaryLength,
    },
    #[serde(rename = "runAIReadAloud")]
    RunAiReadAloud {
        voice: String,
    },
    GetVoiceStatus,
    CloseCurrentTab,
}

impl Message {
    pub fn action(&self) -> &'static str {
        match self {
            Message::Ping => "ping",
            Message::ToggleFeature { .. } => "toggleFeature",
            Message::AdjustFontSize { .. } => "adjustFontSize",
            Message::AddSkipLink => "addSkipLink",
            Message::RunSummarize { .. } => "runSummarize",
            Message::RunSimplify { .. } => "runSimplify",
            Message::RunTranslatePage { .. } => "runTranslatePage",
            Message::RunImageDescription { .. } => "runImageDescription",
            Message::RunAiTranslatePage { .. } => "runAITranslatePage",
            Message::RunAiSummarizePage { .. } => "runAISummarizePage",
            Message::RunAiReadAloud { .. } => "runAIReadAloud",
            Message::GetVoiceStatus => "getVoiceStatus",
            Message::CloseCurrentTab => "closeCurrentTab",
        }
    }
}

/// Direction of a font-size request. Anything unrecognised resets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontAdjust {
    Increase,
    Decrease,
    #[serde(other)]
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Ready,
    Received,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
    Status { status: Status },
    VoiceStatus { listening: bool },
}

impl Response {
    pub fn ready() -> Self {
        Response::Status {
            status: Status::Ready,
        }
    }

    pub fn received() -> Self {
        Response::Status {
            status: Status::Received,
        }
    }

    pub fn voice_status(listening: bool) -> Self {
        Response::VoiceStatus { listening }
    }
}

/// Events raised inside the page itself rather than sent by another context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum PageEvent {
    PointerMove { y: f64 },
    Voice { voice: VoiceEvent },
    FocusExitClicked,
    SpeechFinished { success: bool },
}

/// One line of host input: a message from another context or a page event.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum HostInput {
    Message(Message),
    Event(PageEvent),
}
