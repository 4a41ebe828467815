use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub type Rgb = (u8, u8, u8);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Which procedural renderer draws the orb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrbStyleKind {
    Energy,
    Holo,
    Smooth,
}

impl std::str::FromStr for OrbStyleKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "energy" => Ok(Self::Energy),
            "holo" => Ok(Self::Holo),
            "smooth" => Ok(Self::Smooth),
            other => Err(format!("unknown orb style '{}' (energy, holo, smooth)", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub background: Rgb,
    pub idle: Rgb,
    pub attentive: Rgb,
    pub thinking: Rgb,
    pub speaking: Rgb,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: (12, 12, 16),
            idle: (60, 140, 255),
            attentive: (40, 220, 120),
            thinking: (0, 255, 180),
            speaking: (255, 0, 150),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub url: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:11434/api/generate".to_string(),
            model: "phi3".to_string(),
            timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TcpConfig {
    pub enabled: bool,
    pub host: String,
    pub port: u16,
}

impl Default for TcpConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            host: "0.0.0.0".to_string(),
            port: 5050,
        }
    }
}

impl TcpConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    pub enabled: bool,
    pub wake_word: String,
    pub stt_url: String,
    pub tts_url: String,
    pub speaker_wav: PathBuf,
    pub language: String,
    pub cache_dir: PathBuf,
    pub phrase_time_limit_secs: f32,
    pub wake_window_secs: f32,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            wake_word: "luma".to_string(),
            stt_url: "http://localhost:8178/inference".to_string(),
            tts_url: "http://localhost:8020/tts_to_audio".to_string(),
            speaker_wav: PathBuf::from("assets/luma_identity.wav"),
            language: "en".to_string(),
            cache_dir: PathBuf::from("assets/voice_cache"),
            phrase_time_limit_secs: 3.0,
            wake_window_secs: 8.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LumaConfig {
    pub width: u32,
    pub height: u32,
    /// Fixed on-screen orb radius.
    pub radius: u32,

    // Breathing
    pub base_radius: u32,
    pub pulse_amp: f32,
    pub pulse_hz: f32,
    pub organic_wobble: f32,

    /// How long Luma stays attentive after input.
    pub attentive_seconds: f32,
    pub fps: u32,
    pub orb_style: OrbStyleKind,
    pub palette: Palette,

    pub llm: LlmConfig,
    pub max_history: usize,
    pub user_name: String,
    pub knowledge_dir: PathBuf,
    /// Delay between archive progress steps.
    pub archive_step_ms: u64,

    pub tcp: TcpConfig,
    pub voice: VoiceConfig,
}

impl Default for LumaConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 480,
            radius: 110,
            base_radius: 56,
            pulse_amp: 0.10,
            pulse_hz: 0.18,
            organic_wobble: 0.035,
            attentive_seconds: 0.7,
            fps: 60,
            orb_style: OrbStyleKind::Smooth,
            palette: Palette::default(),
            llm: LlmConfig::default(),
            max_history: 6,
            user_name: "Lau".to_string(),
            knowledge_dir: PathBuf::from("knowledge"),
            archive_step_ms: 400,
            tcp: TcpConfig::default(),
            voice: VoiceConfig::default(),
        }
    }
}

impl LumaConfig {
    /// Loads the config at `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn frame_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(1000 / u64::from(self.fps.max(1)))
    }
}
