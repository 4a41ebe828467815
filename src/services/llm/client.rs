use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::LlmConfig;

#[derive(Clone)]
pub struct LLMService {
    client: Client,
    url: String,
    model: String,
    timeout: Duration,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
    stop: Vec<String>,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

impl LLMService {
    pub fn new(cfg: &LlmConfig) -> Self {
        let timeout = Duration::from_secs(cfg.timeout_secs.max(1));
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            url: cfg.url.clone(),
            model: cfg.model.clone(),
            timeout,
        }
    }

    /// Network-level timeout, also used by the driver as a hard cap.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// One-shot, non-streaming completion against an Ollama-style
    /// `/api/generate` endpoint.
    pub async fn complete(&self, prompt: &str) -> Result<String> {
        let request_body = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: GenerateOptions {
                temperature: 0.6,
                stop: vec!["User:".to_string()],
            },
        };

        let response = self.client.post(&self.url)
            .json(&request_body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!("LLM Server Error: {}", response.status()));
        }

        let resp_json: GenerateResponse = response.json().await?;
        let text = resp_json.response.trim().to_string();
        if text.is_empty() {
            return Err(anyhow!("LLM returned an empty completion"));
        }
        Ok(text)
    }
}
