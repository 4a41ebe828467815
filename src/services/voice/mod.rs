//! Voice I/O against external speech services.

pub mod cache;
pub mod engine;
pub mod playback;
pub mod stt;
pub mod tts;
pub mod wake;

pub use cache::VoiceCache;
pub use engine::{VoiceFlags, VoiceListener, VoiceOutput};
pub use wake::{WakeAction, WakeGate};

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VoiceError {
    #[error("voice service request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("voice service returned {0}")]
    Status(reqwest::StatusCode),
    #[error("voice service returned no audio")]
    EmptyAudio,
    #[error("voice cache I/O on {path}: {source}")]
    Cache {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
