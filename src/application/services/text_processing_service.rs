use std::sync::Arc;

use tracing::{debug, info, instrument};

use super::cost_calculator::CostCalculator;
use super::prompts::processing_prompt;
use super::result_normalizer::normalize_text;
use super::service_error::ServiceError;
use super::tier_selector::TierSelector;
use crate::application::ports::{
    SamplingParams, StyleGuideRepository, TextGenerationRequest, TextGenerator,
    TranscriptionRepository,
};
use crate::domain::{
    Operation, PROVIDER_GEMINI, StyleGuideId, Transcription, TranscriptionId, UsageArtifact,
    UsageEvent, UsageQuantities, UserId,
};

pub const PROCESSING_SAMPLING: SamplingParams = SamplingParams {
    temperature: 0.3,
    max_output_tokens: 8000,
};

/// Rewrites a transcription according to a free-form instruction.
pub struct TextProcessingService {
    generator: Arc<dyn TextGenerator>,
    tiers: TierSelector,
    transcriptions: Arc<dyn TranscriptionRepository>,
    style_guides: Arc<dyn StyleGuideRepository>,
    calculator: Arc<CostCalculator>,
}

impl TextProcessingService {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        tiers: TierSelector,
        transcriptions: Arc<dyn TranscriptionRepository>,
        style_guides: Arc<dyn StyleGuideRepository>,
        calculator: Arc<CostCalculator>,
    ) -> Self {
        Self {
            generator,
            tiers,
            transcriptions,
            style_guides,
            calculator,
        }
    }

    #[instrument(skip(self, instruction), fields(user = %user_id, transcription = %id))]
    pub async fn process(
        &self,
        user_id: UserId,
        id: TranscriptionId,
        instruction: &str,
        style_guide_id: Option<StyleGuideId>,
    ) -> Result<Transcription, ServiceError> {
        let mut transcription = self
            .transcriptions
            .get(id, user_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("transcription {id} not found")))?;

        let instruction = instruction.trim();
        if instruction.is_empty() {
            return Err(ServiceError::Validation("no instruction provided".to_string()));
        }

        let style_guide = match style_guide_id {
            Some(guide_id) => self.style_guides.get(guide_id, user_id).await?,
            None => None,
        };
        let style_content = style_guide.as_ref().and_then(|g| g.usable_content());
        debug!(with_style_guide = style_content.is_some(), "Building processing prompt");

        let request = TextGenerationRequest {
            prompt: processing_prompt(&transcription.raw_text, instruction, style_content),
            system_instruction: None,
            sampling: PROCESSING_SAMPLING,
        };

        let served = self
            .tiers
            .invoke(Operation::Process, |credential| {
                let request = &request;
                async move {
                    normalize_text(
                        self.generator.generate(request, &credential).await,
                        credential.tier,
                    )
                }
            })
            .await
            .into_result()
            .map_err(ServiceError::Provider)?;

        transcription.instruction = Some(instruction.to_string());
        transcription.processed_text = Some(served.payload);
        transcription.updated_at = chrono::Utc::now();

        let usage = served.usage.has_tokens().then(|| {
            let model = self.generator.model();
            let quantities = UsageQuantities::Tokens {
                input_tokens: served.usage.input_tokens,
                output_tokens: served.usage.output_tokens,
            };
            UsageEvent::new(
                user_id,
                PROVIDER_GEMINI,
                model,
                Operation::Process,
                served.tier,
                quantities,
                self.calculator.price(model, &quantities),
                Some(UsageArtifact::Transcription(transcription.id)),
            )
        });

        self.transcriptions
            .update(&transcription, usage.as_ref())
            .await?;

        info!(
            tier = %served.tier,
            input_tokens = served.usage.input_tokens,
            output_tokens = served.usage.output_tokens,
            "Transcription processed"
        );

        Ok(transcription)
    }
}
