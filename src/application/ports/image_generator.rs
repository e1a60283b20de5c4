use async_trait::async_trait;

use super::{ApiCredential, ContentResponse, ProviderError};
use crate::domain::{ConversationTurn, ImageResolution};

#[derive(Debug, Clone, PartialEq)]
pub struct ImageGenerationRequest {
    pub prompt: String,
    pub history: Vec<ConversationTurn>,
    pub system_instruction: Option<String>,
    pub aspect_ratio: String,
    pub resolution: ImageResolution,
}

#[async_trait]
pub trait ImageGenerator: Send + Sync {
    fn model(&self) -> &str;

    async fn generate(
        &self,
        request: &ImageGenerationRequest,
        credential: &ApiCredential,
    ) -> Result<ContentResponse, ProviderError>;
}
