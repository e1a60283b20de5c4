use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::application::ports::{
    ApiCredential, ContentResponse, ImageGenerationRequest, ImageGenerator, ProviderError,
    TextGenerationRequest, TextGenerator,
};
use crate::application::services::{GEMINI_IMAGE_MODEL, GEMINI_TEXT_MODEL};

type Scripted = Result<ContentResponse, ProviderError>;

/// Per-key response queues and call counters shared by the scripted doubles.
struct Script<R> {
    responses: Mutex<HashMap<String, VecDeque<Scripted>>>,
    calls: Mutex<HashMap<String, usize>>,
    requests: Mutex<Vec<R>>,
}

impl<R> Default for Script<R> {
    fn default() -> Self {
        Self {
            responses: Mutex::default(),
            calls: Mutex::default(),
            requests: Mutex::default(),
        }
    }
}

impl<R: Clone> Script<R> {
    fn push(&self, api_key: &str, response: Scripted) {
        if let Ok(mut responses) = self.responses.lock() {
            responses
                .entry(api_key.to_string())
                .or_default()
                .push_back(response);
        }
    }

    fn next(&self, credential: &ApiCredential, request: &R) -> Scripted {
        if let Ok(mut calls) = self.calls.lock() {
            *calls.entry(credential.api_key.clone()).or_default() += 1;
        }
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        self.responses
            .lock()
            .ok()
            .and_then(|mut r| r.get_mut(&credential.api_key)?.pop_front())
            .unwrap_or_else(|| {
                Err(ProviderError::ApiRequestFailed(
                    "no scripted response".to_string(),
                ))
            })
    }

    fn calls_for(&self, api_key: &str) -> usize {
        self.calls
            .lock()
            .map(|c| c.get(api_key).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    fn requests(&self) -> Vec<R> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

/// Text generator answering from queued responses keyed by API key.
pub struct ScriptedTextGenerator {
    model: String,
    script: Script<TextGenerationRequest>,
}

impl Default for ScriptedTextGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedTextGenerator {
    pub fn new() -> Self {
        Self {
            model: GEMINI_TEXT_MODEL.to_string(),
            script: Script::default(),
        }
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub fn respond(self, api_key: &str, response: Scripted) -> Self {
        self.script.push(api_key, response);
        self
    }

    pub fn calls_for(&self, api_key: &str) -> usize {
        self.script.calls_for(api_key)
    }

    pub fn requests(&self) -> Vec<TextGenerationRequest> {
        self.script.requests()
    }
}

#[async_trait]
impl TextGenerator for ScriptedTextGenerator {
    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(
        &self,
        request: &TextGenerationRequest,
        credential: &ApiCredential,
    ) -> Result<ContentResponse, ProviderError> {
        self.script.next(credential, request)
    }
}

/// Image generator answering from queued responses keyed by API key.
pub struct ScriptedImageGenerator {
    model: String,
    script: Script<ImageGenerationRequest>,
}

impl Default for ScriptedImageGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedImageGenerator {
    pub fn new() -> Self {
        Self {
            model: GEMINI_IMAGE_MODEL.to_string(),
            script: Script::default(),
        }
    }

    pub fn respond(self, api_key: &str, response: Scripted) -> Self {
        self.script.push(api_key, response);
        self
    }

    pub fn calls_for(&self, api_key: &str) -> usize {
        self.script.calls_for(api_key)
    }

    pub fn requests(&self) -> Vec<ImageGenerationRequest> {
        self.script.requests()
    }
}

#[async_trait]
impl ImageGenerator for ScriptedImageGenerator {
    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(
        &self,
        request: &ImageGenerationRequest,
        credential: &ApiCredential,
    ) -> Result<ContentResponse, ProviderError> {
        self.script.next(credential, request)
    }
}
