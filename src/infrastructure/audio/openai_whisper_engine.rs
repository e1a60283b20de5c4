use async_trait::async_trait;
use reqwest::{StatusCode, multipart};
use serde::Deserialize;

use crate::application::ports::{
    ApiCredential, ProviderError, RawTranscript, TranscriptionEngine, TranscriptionRequest,
};
use crate::application::services::{WHISPER_MODEL, audio_content_type, audio_suffix};

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

pub struct OpenAiWhisperEngine {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

#[derive(Deserialize)]
struct VerboseTranscription {
    text: String,
    #[serde(default)]
    duration: Option<f64>,
}

impl OpenAiWhisperEngine {
    pub fn new(base_url: Option<String>, model: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            model: model.unwrap_or_else(|| WHISPER_MODEL.to_string()),
        }
    }
}

#[async_trait]
impl TranscriptionEngine for OpenAiWhisperEngine {
    fn model(&self) -> &str {
        &self.model
    }

    async fn transcribe(
        &self,
        request: &TranscriptionRequest,
        credential: &ApiCredential,
    ) -> Result<RawTranscript, ProviderError> {
        let url = format!("{}/audio/transcriptions", self.base_url);
        let mime = audio_content_type(audio_suffix(&request.filename).as_deref());

        let file_part = multipart::Part::bytes(request.audio.to_vec())
            .file_name(request.filename.clone())
            .mime_str(mime)
            .map_err(|e| ProviderError::ApiRequestFailed(format!("mime: {}", e)))?;

        let mut form = multipart::Form::new()
            .text("model", self.model.clone())
            .text("response_format", "verbose_json")
            .part("file", file_part);
        if let Some(language) = &request.language_hint {
            form = form.text("language", language.clone());
        }
        if let Some(prompt) = &request.prompt {
            form = form.text("prompt", prompt.clone());
        }

        tracing::debug!(model = %self.model, tier = %credential.tier, bytes = request.audio.len(), "Sending audio to OpenAI Whisper API");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&credential.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ProviderError::ApiRequestFailed(format!("request: {}", e)))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited);
        }
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Unauthorized(format!("status {}: {}", status, body)));
        }
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(ProviderError::ApiRequestFailed(format!(
                "status {}: {}",
                status, body
            )));
        }

        let transcript: VerboseTranscription = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(format!("body: {}", e)))?;

        tracing::info!(
            chars = transcript.text.len(),
            duration = transcript.duration,
            "OpenAI Whisper transcription completed"
        );

        Ok(RawTranscript {
            text: transcript.text,
            duration_seconds: transcript.duration,
        })
    }
}
