use super::event::{InputContent, InputEvent};

/// Whole utterances that interrupt Luma instead of being dispatched.
const CANCEL_PHRASES: &[&str] = &["stop", "cancel", "be quiet", "never mind", "nevermind"];

#[derive(Debug, Default)]
pub struct CancellationRegistry {
    canceled: u64,
}

impl CancellationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Matches the whole message, ignoring case and trailing punctuation,
    /// so "stop the music" or "cancel my project" still reach the skills.
    pub fn is_cancel(text: &str) -> bool {
        let cleaned = text
            .trim()
            .trim_end_matches(|c: char| c.is_ascii_punctuation())
            .to_lowercase();
        CANCEL_PHRASES.iter().any(|p| cleaned == *p)
    }

    /// Pure decision over a batch: true if any input asks to cancel.
    pub fn process(&mut self, inputs: &[InputEvent]) -> bool {
        let hit = inputs.iter().any(|input| match &input.content {
            InputContent::Text(text) => Self::is_cancel(text),
            _ => false,
        });
        if hit {
            self.canceled += 1;
        }
        hit
    }

    pub fn canceled_count(&self) -> u64 {
        self.canceled
    }
}
