//! Speech-to-text client for recorded interview answers.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::LlmConfig;
use crate::llm_client::LlmError;

const MAX_RETRIES: u32 = 3;
const DEFAULT_AUDIO_TYPE: &str = "audio/webm";

/// A recorded answer as uploaded by the browser.
#[derive(Debug, Clone)]
pub struct AudioUpload {
    pub bytes: Bytes,
    pub file_name: String,
    pub content_type: Option<String>,
}

/// Optional hints forwarded to the transcription model.
#[derive(Debug, Clone, Default)]
pub struct TranscriptionHints {
    pub language: Option<String>,
    pub prompt: Option<String>,
}

#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(
        &self,
        audio: AudioUpload,
        hints: TranscriptionHints,
    ) -> Result<String, LlmError>;
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

/// OpenAI-compatible `/audio/transcriptions` client.
#[derive(Clone)]
pub struct OpenAiTranscriber {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl OpenAiTranscriber {
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .build()?,
            endpoint: format!("{}/audio/transcriptions", config.api_base),
            api_key: config.api_key.clone(),
            model: config.transcription_model.clone(),
        })
    }

    fn build_form(&self, audio: &AudioUpload, hints: &TranscriptionHints) -> Result<Form, LlmError> {
        let content_type = audio
            .content_type
            .as_deref()
            .unwrap_or(DEFAULT_AUDIO_TYPE);
        let file = Part::stream(audio.bytes.clone())
            .file_name(audio.file_name.clone())
            .mime_str(content_type)?;

        let mut form = Form::new()
            .part("file", file)
            .text("model", self.model.clone())
            .text("response_format", "json");
        if let Some(language) = hints.language.as_deref().filter(|l| !l.is_empty()) {
            form = form.text("language", language.to_string());
        }
        if let Some(prompt) = hints.prompt.as_deref().filter(|p| !p.is_empty()) {
            form = form.text("prompt", prompt.to_string());
        }
        Ok(form)
    }
}

#[async_trait]
impl Transcriber for OpenAiTranscriber {
    async fn transcribe(
        &self,
        audio: AudioUpload,
        hints: TranscriptionHints,
    ) -> Result<String, LlmError> {
        let mut last_error: Option<LlmError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                let delay = Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "Transcription attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            // Multipart forms are consumed by `send`, so rebuild per attempt.
            let form = self.build_form(&audio, &hints)?;
            let response = match self
                .client
                .post(&self.endpoint)
                .bearer_auth(&self.api_key)
                .multipart(form)
                .send()
                .await
            {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(LlmError::Http(e));
                    continue;
                }
            };

            let status = response.status();
            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("Transcription API returned {}: {}", status, body);
                last_error = Some(LlmError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }
            if !status.is_success() {
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message: response.text().await.unwrap_or_default(),
                });
            }

            let body: TranscriptionResponse = response.json().await?;
            debug!("Transcribed {} bytes of audio", audio.bytes.len());
            return Ok(body.text);
        }

        Err(last_error.unwrap_or(LlmError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }
}
