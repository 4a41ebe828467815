use tracing::debug;

/// webrtc-vad frame length.
pub const FRAME_MS: usize = 30;

pub fn frame_size(sample_rate: u32) -> usize {
    sample_rate as usize * FRAME_MS / 1000
}

/// Turns a stream of classified VAD frames into whole utterances.
///
/// Speech must persist for `min_speech_frames` to open an utterance. It closes
/// after `min_silence_frames` of silence or once it reaches the phrase limit.
#[derive(Debug)]
pub struct UtteranceSegmenter {
    min_speech_frames: usize,
    min_silence_frames: usize,
    max_frames: usize,

    is_speaking: bool,
    consecutive_speech: usize,
    consecutive_silence: usize,
    frames_in_utterance: usize,
    // Frames seen before speech was confirmed, so onsets are not clipped
    onset: Vec<f32>,
    buffer: Vec<f32>,
}

impl UtteranceSegmenter {
    pub fn new(phrase_time_limit_secs: f32) -> Self {
        let max_frames = ((phrase_time_limit_secs.max(0.1) * 1000.0) as usize / FRAME_MS).max(1);
        Self {
            min_speech_frames: 3,   // 90ms to open
            min_silence_frames: 20, // 600ms to close
            max_frames,
            is_speaking: false,
            consecutive_speech: 0,
            consecutive_silence: 0,
            frames_in_utterance: 0,
            onset: Vec::new(),
            buffer: Vec::new(),
        }
    }

    pub fn is_speaking(&self) -> bool {
        self.is_speaking
    }

    pub fn reset(&mut self) {
        self.is_speaking = false;
        self.consecutive_speech = 0;
        self.consecutive_silence = 0;
        self.frames_in_utterance = 0;
        self.onset.clear();
        self.buffer.clear();
    }

    /// Feeds one frame. Returns a finished utterance when one closes.
    pub fn push_frame(&mut self, frame: &[f32], is_speech: bool) -> Option<Vec<f32>> {
        if is_speech {
            self.consecutive_silence = 0;
            self.consecutive_speech += 1;
        } else {
            self.consecutive_speech = 0;
            self.consecutive_silence += 1;
        }

        if !self.is_speaking {
            if is_speech {
                self.onset.extend_from_slice(frame);
                if self.consecutive_speech >= self.min_speech_frames {
                    debug!("Utterance start");
                    self.is_speaking = true;
                    self.buffer = std::mem::take(&mut self.onset);
                    self.frames_in_utterance = self.consecutive_speech;
                }
            } else {
                self.onset.clear();
            }
            return None;
        }

        self.buffer.extend_from_slice(frame);
        self.frames_in_utterance += 1;

        if self.consecutive_silence >= self.min_silence_frames || self.frames_in_utterance >= self.max_frames {
            debug!("Utterance end after {} frames", self.frames_in_utterance);
            let utterance = std::mem::take(&mut self.buffer);
            self.reset();
            return Some(utterance);
        }
        None
    }
}

/// Float frame to the i16 layout webrtc-vad wants.
pub fn to_i16(frame: &[f32], out: &mut Vec<i16>) {
    out.clear();
    out.extend(frame.iter().map(|&s| (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16));
}
