use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

use super::VoiceError;

/// Synthesized speech on disk, one WAV per normalized sentence.
/// There is no eviction.
#[derive(Debug, Clone)]
pub struct VoiceCache {
    dir: PathBuf,
}

impl VoiceCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Case and surrounding whitespace do not change the key.
    pub fn key(text: &str) -> String {
        let digest = Sha256::digest(text.trim().to_lowercase().as_bytes());
        digest.iter().map(|b| format!("{:02x}", b)).collect()
    }

    pub fn path_for(&self, text: &str) -> PathBuf {
        self.dir.join(format!("{}.wav", Self::key(text)))
    }

    pub fn lookup(&self, text: &str) -> Option<PathBuf> {
        let path = self.path_for(text);
        path.is_file().then_some(path)
    }

    pub fn store(&self, text: &str, wav: &[u8]) -> Result<PathBuf, VoiceError> {
        fs::create_dir_all(&self.dir).map_err(|source| VoiceError::Cache {
            path: self.dir.clone(),
            source,
        })?;
        let path = self.path_for(text);
        fs::write(&path, wav).map_err(|source| VoiceError::Cache {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}
