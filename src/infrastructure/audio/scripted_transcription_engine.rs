use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::application::ports::{
    ApiCredential, ProviderError, RawTranscript, TranscriptionEngine, TranscriptionRequest,
};
use crate::application::services::WHISPER_MODEL;

/// In-process engine returning queued responses per API key.
///
/// Keys with no script left fail with `ApiRequestFailed`. Every call is
/// counted per key, including failing ones.
#[derive(Default)]
pub struct ScriptedTranscriptionEngine {
    scripts: Mutex<HashMap<String, VecDeque<Result<RawTranscript, ProviderError>>>>,
    calls: Mutex<HashMap<String, usize>>,
    requests: Mutex<Vec<TranscriptionRequest>>,
}

impl ScriptedTranscriptionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, api_key: &str, result: Result<RawTranscript, ProviderError>) -> Self {
        if let Ok(mut scripts) = self.scripts.lock() {
            scripts
                .entry(api_key.to_string())
                .or_default()
                .push_back(result);
        }
        self
    }

    pub fn calls_for(&self, api_key: &str) -> usize {
        self.calls
            .lock()
            .map(|calls| calls.get(api_key).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    pub fn requests(&self) -> Vec<TranscriptionRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl TranscriptionEngine for ScriptedTranscriptionEngine {
    fn model(&self) -> &str {
        WHISPER_MODEL
    }

    async fn transcribe(
        &self,
        request: &TranscriptionRequest,
        credential: &ApiCredential,
    ) -> Result<RawTranscript, ProviderError> {
        if let Ok(mut calls) = self.calls.lock() {
            *calls.entry(credential.api_key.clone()).or_default() += 1;
        }
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        self.scripts
            .lock()
            .ok()
            .and_then(|mut scripts| scripts.get_mut(&credential.api_key)?.pop_front())
            .unwrap_or_else(|| {
                Err(ProviderError::ApiRequestFailed(
                    "no scripted response".to_string(),
                ))
            })
    }
}
