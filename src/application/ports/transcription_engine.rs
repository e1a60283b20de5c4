use async_trait::async_trait;
use bytes::Bytes;

use super::{ApiCredential, ProviderError};

#[derive(Debug, Clone)]
pub struct TranscriptionRequest {
    pub audio: Bytes,
    pub filename: String,
    pub language_hint: Option<String>,
    pub prompt: Option<String>,
}

/// Raw transcription result; duration is only present when the provider reports it.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTranscript {
    pub text: String,
    pub duration_seconds: Option<f64>,
}

#[async_trait]
pub trait TranscriptionEngine: Send + Sync {
    fn model(&self) -> &str;

    async fn transcribe(
        &self,
        request: &TranscriptionRequest,
        credential: &ApiCredential,
    ) -> Result<RawTranscript, ProviderError>;
}
