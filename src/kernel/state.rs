use std::collections::VecDeque;
use uuid::Uuid;

use super::time::Tick;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    User,
    Luma,
}

impl Speaker {
    pub fn label(&self) -> &'static str {
        match self {
            Speaker::User => "User",
            Speaker::Luma => "Luma",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub speaker: Speaker,
    pub text: String,
}

impl Turn {
    pub fn user(text: &str) -> Self {
        Self { speaker: Speaker::User, text: text.to_string() }
    }

    pub fn luma(text: &str) -> Self {
        Self { speaker: Speaker::Luma, text: text.to_string() }
    }
}

/// Strict state delta. This is the ONLY way session state mutates.
#[derive(Debug, Clone)]
pub enum StateDelta {
    Tick(Tick),
    TurnRecorded(Turn),
    CompletionRequested(Uuid),
    /// Clears the pending request and the thinking flag.
    CompletionSettled(Uuid),
    CompletionCanceled,
    ResponseRecorded(String),
    SpeakingChanged(bool),
}

#[derive(Debug, Clone)]
pub struct SessionState {
    history: VecDeque<Turn>,
    max_history: usize,
    pending_request: Option<Uuid>,
    last_response: String,
    /// Monotonic version, bumped on every reduction.
    pub version: u64,
    pub last_tick: Tick,
    pub thinking: bool,
    pub speaking: bool,
}

impl SessionState {
    pub fn new(max_history: usize) -> Self {
        Self {
            history: VecDeque::with_capacity(max_history),
            max_history,
            pending_request: None,
            last_response: String::new(),
            version: 0,
            last_tick: Tick::new(),
            thinking: false,
            speaking: false,
        }
    }

    /// Pure reduction: State + Delta -> Mutated State
    pub fn reduce(&mut self, delta: StateDelta) {
        self.version += 1;

        match delta {
            StateDelta::Tick(t) => {
                self.last_tick = t;
            }
            StateDelta::TurnRecorded(turn) => {
                if self.max_history == 0 {
                    return;
                }
                while self.history.len() >= self.max_history {
                    self.history.pop_front();
                }
                self.history.push_back(turn);
            }
            StateDelta::CompletionRequested(id) => {
                self.pending_request = Some(id);
                self.thinking = true;
            }
            StateDelta::CompletionSettled(id) => {
                if self.pending_request == Some(id) {
                    self.pending_request = None;
                    self.thinking = false;
                }
            }
            StateDelta::CompletionCanceled => {
                self.pending_request = None;
                self.thinking = false;
            }
            StateDelta::ResponseRecorded(text) => {
                self.last_response = text;
            }
            StateDelta::SpeakingChanged(speaking) => {
                self.speaking = speaking;
            }
        }
    }

    pub fn history(&self) -> &VecDeque<Turn> {
        &self.history
    }

    /// History as plain lines, oldest first.
    pub fn history_lines(&self) -> Vec<String> {
        self.history
            .iter()
            .map(|t| format!("{}: {}", t.speaker.label(), t.text))
            .collect()
    }

    pub fn pending_request(&self) -> Option<Uuid> {
        self.pending_request
    }

    pub fn last_response(&self) -> &str {
        &self.last_response
    }
}
