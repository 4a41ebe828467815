use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use super::VoiceError;

#[derive(Deserialize)]
struct TranscriptResponse {
    text: String,
}

/// Client for an external Whisper-style transcription server.
/// Posts WAV bytes and reads back `{"text": ...}`.
#[derive(Clone)]
pub struct HttpTranscriber {
    client: Client,
    url: String,
}

impl HttpTranscriber {
    pub fn new(url: &str) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(15))
                .build()
                .unwrap_or_default(),
            url: url.to_string(),
        }
    }

    /// Lowercased, trimmed transcript.
    pub async fn transcribe(&self, wav: Vec<u8>) -> Result<String, VoiceError> {
        let response = self.client.post(&self.url)
            .header(reqwest::header::CONTENT_TYPE, "audio/wav")
            .body(wav)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(VoiceError::Status(response.status()));
        }

        let body: TranscriptResponse = response.json().await?;
        Ok(body.text.trim().to_lowercase())
    }
}
