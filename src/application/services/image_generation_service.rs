use std::sync::Arc;

use tracing::{debug, info, instrument};

use super::conversation_history::ConversationHistory;
use super::cost_calculator::CostCalculator;
use super::prompts::IMAGE_SYSTEM_INSTRUCTION;
use super::result_normalizer::normalize_image;
use super::service_error::ServiceError;
use super::tier_selector::TierSelector;
use crate::application::ports::{
    ImageGenerationRepository, ImageGenerationRequest, ImageGenerator, TranscriptionRepository,
};
use crate::domain::{
    ImageGenerationId, ImageGenerationRecord, ImageResolution, Operation, PROVIDER_GEMINI,
    TranscriptionId, UsageArtifact, UsageEvent, UsageQuantities, UserId,
};

pub const DEFAULT_ASPECT_RATIO: &str = "1:1";
pub const SUPPORTED_ASPECT_RATIOS: &[&str] = &["1:1", "16:9", "9:16", "4:3", "3:4"];

#[derive(Debug, Clone)]
pub struct ImageRequest {
    pub prompt: String,
    /// Turn to continue from; starts a new conversation when absent.
    pub session_id: Option<ImageGenerationId>,
    pub transcription_id: Option<TranscriptionId>,
    pub aspect_ratio: String,
    pub resolution: ImageResolution,
}

pub struct ImageGenerationService {
    generator: Arc<dyn ImageGenerator>,
    tiers: TierSelector,
    images: Arc<dyn ImageGenerationRepository>,
    transcriptions: Arc<dyn TranscriptionRepository>,
    history: ConversationHistory,
    calculator: Arc<CostCalculator>,
}

impl ImageGenerationService {
    pub fn new(
        generator: Arc<dyn ImageGenerator>,
        tiers: TierSelector,
        images: Arc<dyn ImageGenerationRepository>,
        transcriptions: Arc<dyn TranscriptionRepository>,
        calculator: Arc<CostCalculator>,
    ) -> Self {
        let history = ConversationHistory::new(Arc::clone(&images));
        Self {
            generator,
            tiers,
            images,
            transcriptions,
            history,
            calculator,
        }
    }

    #[instrument(
        skip(self, request),
        fields(user = %user_id, session = ?request.session_id, resolution = %request.resolution.as_str())
    )]
    pub async fn generate(
        &self,
        user_id: UserId,
        request: ImageRequest,
    ) -> Result<ImageGenerationRecord, ServiceError> {
        let prompt = request.prompt.trim();
        if prompt.is_empty() {
            return Err(ServiceError::Validation("prompt is required".to_string()));
        }
        if !SUPPORTED_ASPECT_RATIOS.contains(&request.aspect_ratio.as_str()) {
            return Err(ServiceError::Validation(format!(
                "unsupported aspect ratio {}, allowed: {}",
                request.aspect_ratio,
                SUPPORTED_ASPECT_RATIOS.join(", ")
            )));
        }

        if let Some(transcription_id) = request.transcription_id {
            self.transcriptions
                .get(transcription_id, user_id)
                .await?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!("transcription {transcription_id} not found"))
                })?;
        }

        let parent = match request.session_id {
            Some(session_id) => Some(self.images.get(session_id, user_id).await?.ok_or_else(
                || ServiceError::NotFound(format!("image session {session_id} not found")),
            )?),
            None => None,
        };

        let history = match &parent {
            Some(parent) => self.history.reconstruct(parent.id, user_id).await?,
            None => Vec::new(),
        };
        debug!(history_turns = history.len(), "Conversation history prepared");

        let provider_request = ImageGenerationRequest {
            prompt: prompt.to_string(),
            history,
            system_instruction: Some(IMAGE_SYSTEM_INSTRUCTION.to_string()),
            aspect_ratio: request.aspect_ratio.clone(),
            resolution: request.resolution,
        };

        let served = self
            .tiers
            .invoke(Operation::GenerateImage, |credential| {
                let provider_request = &provider_request;
                async move {
                    normalize_image(
                        self.generator.generate(provider_request, &credential).await,
                        credential.tier,
                    )
                }
            })
            .await
            .into_result()
            .map_err(ServiceError::Provider)?;

        let mut record = ImageGenerationRecord::new(user_id, prompt.to_string(), parent.as_ref());
        record.image = Some(served.payload.image);
        record.text_response = served.payload.text;
        record.continuation_token = served.payload.continuation_token;
        record.transcription_id = request.transcription_id;

        let model = self.generator.model();
        let quantities = UsageQuantities::Image {
            input_tokens: served.usage.input_tokens,
            output_tokens: served.usage.output_tokens,
            images_generated: served.usage.images_generated,
            resolution: request.resolution,
        };
        let usage = UsageEvent::new(
            user_id,
            PROVIDER_GEMINI,
            model,
            Operation::GenerateImage,
            served.tier,
            quantities,
            self.calculator.price(model, &quantities),
            Some(UsageArtifact::ImageGeneration(record.id)),
        );

        self.images.create(&record, &usage).await?;

        info!(
            image = %record.id,
            turn = record.turn_number,
            tier = %served.tier,
            cost_usd = usage.cost_usd,
            "Image generated"
        );

        Ok(record)
    }

    pub async fn get(
        &self,
        user_id: UserId,
        id: ImageGenerationId,
    ) -> Result<ImageGenerationRecord, ServiceError> {
        self.images
            .get(id, user_id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    pub async fn list(
        &self,
        user_id: UserId,
        skip: i64,
        limit: i64,
    ) -> Result<(Vec<ImageGenerationRecord>, i64), ServiceError> {
        let items = self.images.list(user_id, skip.max(0), limit.max(0)).await?;
        let total = self.images.count(user_id).await?;
        Ok((items, total))
    }

    pub async fn list_for_transcription(
        &self,
        user_id: UserId,
        transcription_id: TranscriptionId,
    ) -> Result<Vec<ImageGenerationRecord>, ServiceError> {
        Ok(self
            .images
            .list_for_transcription(user_id, transcription_id)
            .await?)
    }

    pub async fn delete(&self, user_id: UserId, id: ImageGenerationId) -> Result<(), ServiceError> {
        if !self.images.delete(id, user_id).await? {
            return Err(not_found(id));
        }
        Ok(())
    }
}

fn not_found(id: ImageGenerationId) -> ServiceError {
    ServiceError::NotFound(format!("image generation {id} not found"))
}
