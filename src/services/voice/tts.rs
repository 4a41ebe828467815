use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use super::VoiceError;

#[derive(Serialize)]
struct SynthesisRequest<'a> {
    text: &'a str,
    speaker_wav: &'a str,
    language: &'a str,
}

/// Client for an external voice-cloning TTS server returning WAV bytes.
#[derive(Clone)]
pub struct HttpSynthesizer {
    client: Client,
    url: String,
    speaker_wav: String,
    language: String,
}

impl HttpSynthesizer {
    pub fn new(url: &str, speaker_wav: &str, language: &str) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(60))
                .build()
                .unwrap_or_default(),
            url: url.to_string(),
            speaker_wav: speaker_wav.to_string(),
            language: language.to_string(),
        }
    }

    pub async fn synthesize(&self, text: &str) -> Result<Vec<u8>, VoiceError> {
        let request = SynthesisRequest {
            text,
            speaker_wav: &self.speaker_wav,
            language: &self.language,
        };
        let response = self.client.post(&self.url).json(&request).send().await?;

        if !response.status().is_success() {
            return Err(VoiceError::Status(response.status()));
        }

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Err(VoiceError::EmptyAudio);
        }
        Ok(bytes.to_vec())
    }
}
