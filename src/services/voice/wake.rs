/// What the listening loop should do with a transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WakeAction {
    Ignore,
    /// Wake word alone: acknowledge and wait for the command.
    Acknowledge,
    Command(String),
}

/// Wake word detection over transcripts.
///
/// "luma, note down buy milk" is a command straight away. "luma" on its own
/// opens a window during which the next transcript is taken as the command.
#[derive(Debug, Clone)]
pub struct WakeGate {
    wake_word: String,
    window_secs: f64,
    armed_until: Option<f64>,
}

impl WakeGate {
    pub fn new(wake_word: &str, window_secs: f32) -> Self {
        Self {
            wake_word: wake_word.trim().to_lowercase(),
            window_secs: f64::from(window_secs),
            armed_until: None,
        }
    }

    pub fn is_armed(&self, now: f64) -> bool {
        self.armed_until.map_or(false, |until| now <= until)
    }

    pub fn feed(&mut self, transcript: &str, now: f64) -> WakeAction {
        let text = transcript.trim().to_lowercase();
        if text.is_empty() {
            return WakeAction::Ignore;
        }

        if let Some(idx) = text.find(&self.wake_word) {
            let rest = text[idx + self.wake_word.len()..]
                .trim_start_matches(|c: char| c.is_ascii_punctuation() || c.is_whitespace())
                .trim_end();
            if rest.is_empty() {
                self.armed_until = Some(now + self.window_secs);
                return WakeAction::Acknowledge;
            }
            self.armed_until = None;
            return WakeAction::Command(rest.to_string());
        }

        if self.is_armed(now) {
            self.armed_until = None;
            return WakeAction::Command(text);
        }
        self.armed_until = None;
        WakeAction::Ignore
    }
}
