use uuid::Uuid;

use crate::skills::SkillKind;

pub const SOURCE_BOT: &str = "BOT_INPUT";
pub const SOURCE_KEYBOARD: &str = "keyboard";
pub const SOURCE_CHAT: &str = "chat";
pub const SOURCE_VOICE: &str = "voice";
pub const SOURCE_CONSOLE: &str = "console";

#[derive(Debug, Clone)]
pub enum Event {
    /// External signals (chat, TCP, voice, keyboard)
    Input(InputEvent),
    CompletionReady { request_id: Uuid, text: String },
    CompletionFailed { request_id: Uuid, reason: String },
    SkillCompleted { skill: SkillKind, reply: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioStatus {
    /// `cached` is true when the clip came from the voice cache.
    PlaybackStarted { cached: bool },
    PlaybackEnded,
}

#[derive(Debug, Clone)]
pub struct InputEvent {
    pub source: String,
    pub content: InputContent,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputContent {
    /// Goes through the skill dispatcher, then the LLM.
    Text(String),
    /// Only marks Luma as attentive (TCP pings, SPACE).
    Signal(String),
    /// Wake word heard with nothing after it.
    WakeWord,
    AudioStatus(AudioStatus),
}

impl InputEvent {
    pub fn text(source: &str, text: &str) -> Self {
        Self {
            source: source.to_string(),
            content: InputContent::Text(text.to_string()),
        }
    }

    pub fn signal(source: &str, text: &str) -> Self {
        Self {
            source: source.to_string(),
            content: InputContent::Signal(text.to_string()),
        }
    }

    pub fn audio(status: AudioStatus) -> Self {
        Self {
            source: "driver".to_string(),
            content: InputContent::AudioStatus(status),
        }
    }
}

impl From<InputEvent> for Event {
    fn from(input: InputEvent) -> Self {
        Event::Input(input)
    }
}
