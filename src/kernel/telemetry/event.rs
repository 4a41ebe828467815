use serde::{Deserialize, Serialize};

use crate::kernel::presence::PresenceState;
use crate::kernel::time::Tick;
use crate::skills::SkillKind;

// Allowed: kinds, ticks, counts. Forbidden: text, audio.

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TelemetryEvent {
    PresenceTransition {
        from: PresenceState,
        to: PresenceState,
        tick: Tick,
    },

    Input {
        source: InputSourceKind,
    },

    SkillInvoked {
        skill: SkillKind,
    },

    Completion {
        event: CompletionEventKind,
        latency_ticks: u64,
    },

    Speech {
        event: SpeechEventKind,
    },

    SessionSummary {
        duration_ticks: u64,
        inputs: u64,
        skills: u64,
        completions: u64,
        failures: u64,
        utterances: u64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputSourceKind {
    Chat,
    Voice,
    Bot,
    Keyboard,
    Console,
    Other,
}

impl InputSourceKind {
    pub fn from_source(source: &str) -> Self {
        use crate::kernel::event::{SOURCE_BOT, SOURCE_CHAT, SOURCE_CONSOLE, SOURCE_KEYBOARD, SOURCE_VOICE};
        match source {
            SOURCE_CHAT => Self::Chat,
            SOURCE_VOICE => Self::Voice,
            SOURCE_BOT => Self::Bot,
            SOURCE_KEYBOARD => Self::Keyboard,
            SOURCE_CONSOLE => Self::Console,
            _ => Self::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompletionEventKind {
    Requested,
    Completed,
    Failed,
    /// Reply for a request that was already superseded or canceled.
    Stale,
    Canceled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpeechEventKind {
    Started { cached: bool },
    Ended,
    Stopped,
}
