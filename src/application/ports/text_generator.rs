use async_trait::async_trait;

use super::{ApiCredential, ContentResponse, ProviderError};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingParams {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextGenerationRequest {
    pub prompt: String,
    pub system_instruction: Option<String>,
    pub sampling: SamplingParams,
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Model identifier used for pricing.
    fn model(&self) -> &str;

    async fn generate(
        &self,
        request: &TextGenerationRequest,
        credential: &ApiCredential,
    ) -> Result<ContentResponse, ProviderError>;
}
