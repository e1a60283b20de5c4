use std::sync::Arc;

use tracing::{info, instrument};

use super::cost_calculator::CostCalculator;
use super::prompts::style_guide_prompt;
use super::result_normalizer::normalize_text;
use super::service_error::ServiceError;
use super::tier_selector::TierSelector;
use crate::application::ports::{
    SamplingParams, StyleGuideRepository, TextGenerationRequest, TextGenerator,
};
use crate::domain::{
    Operation, PROVIDER_GEMINI, StyleGuide, StyleGuideId, UsageArtifact, UsageEvent,
    UsageQuantities, UserId,
};

pub const STYLE_GUIDE_SAMPLING: SamplingParams = SamplingParams {
    temperature: 0.4,
    max_output_tokens: 2000,
};

/// Partial update; `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct StyleGuideChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub examples: Option<String>,
    pub guide_content: Option<String>,
}

pub struct StyleGuideService {
    repository: Arc<dyn StyleGuideRepository>,
    generator: Arc<dyn TextGenerator>,
    tiers: TierSelector,
    calculator: Arc<CostCalculator>,
}

impl StyleGuideService {
    pub fn new(
        repository: Arc<dyn StyleGuideRepository>,
        generator: Arc<dyn TextGenerator>,
        tiers: TierSelector,
        calculator: Arc<CostCalculator>,
    ) -> Self {
        Self {
            repository,
            generator,
            tiers,
            calculator,
        }
    }

    pub async fn list(&self, user_id: UserId) -> Result<Vec<StyleGuide>, ServiceError> {
        Ok(self.repository.list(user_id).await?)
    }

    pub async fn get(&self, user_id: UserId, id: StyleGuideId) -> Result<StyleGuide, ServiceError> {
        self.repository
            .get(id, user_id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    #[instrument(skip(self, description, examples), fields(user = %user_id))]
    pub async fn create(
        &self,
        user_id: UserId,
        name: &str,
        description: Option<String>,
        examples: Option<String>,
    ) -> Result<StyleGuide, ServiceError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ServiceError::Validation("name is required".to_string()));
        }

        let guide = StyleGuide::new(user_id, name.to_string(), description, examples);
        self.repository.create(&guide).await?;
        info!(style_guide = %guide.id, "Style guide created");
        Ok(guide)
    }

    #[instrument(skip(self, changes), fields(user = %user_id, style_guide = %id))]
    pub async fn update(
        &self,
        user_id: UserId,
        id: StyleGuideId,
        changes: StyleGuideChanges,
    ) -> Result<StyleGuide, ServiceError> {
        let mut guide = self.get(user_id, id).await?;

        if let Some(name) = changes.name {
            let name = name.trim();
            if name.is_empty() {
                return Err(ServiceError::Validation("name is required".to_string()));
            }
            guide.name = name.to_string();
        }
        if let Some(description) = changes.description {
            guide.description = Some(description);
        }
        if let Some(examples) = changes.examples {
            guide.examples = Some(examples);
        }
        if let Some(content) = changes.guide_content {
            guide.guide_content = Some(content);
        }
        guide.updated_at = chrono::Utc::now();

        self.repository.update(&guide, None).await?;
        Ok(guide)
    }

    pub async fn delete(&self, user_id: UserId, id: StyleGuideId) -> Result<(), ServiceError> {
        if !self.repository.delete(id, user_id).await? {
            return Err(not_found(id));
        }
        Ok(())
    }

    #[instrument(skip(self), fields(user = %user_id, style_guide = %id))]
    pub async fn set_default(
        &self,
        user_id: UserId,
        id: StyleGuideId,
    ) -> Result<StyleGuide, ServiceError> {
        let mut guide = self.get(user_id, id).await?;
        self.repository.set_default(id, user_id).await?;
        guide.is_default = true;
        Ok(guide)
    }

    /// Derives `guide_content` from the guide's examples and description.
    #[instrument(skip(self), fields(user = %user_id, style_guide = %id))]
    pub async fn generate(
        &self,
        user_id: UserId,
        id: StyleGuideId,
    ) -> Result<StyleGuide, ServiceError> {
        let mut guide = self.get(user_id, id).await?;

        let examples = guide
            .examples
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .ok_or_else(|| ServiceError::Validation("no text examples provided".to_string()))?;

        let request = TextGenerationRequest {
            prompt: style_guide_prompt(examples, guide.description.as_deref()),
            system_instruction: None,
            sampling: STYLE_GUIDE_SAMPLING,
        };

        let served = self
            .tiers
            .invoke(Operation::GenerateStyle, |credential| {
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

        guide.guide_content = Some(served.payload);
        guide.updated_at = chrono::Utc::now();

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
                Operation::GenerateStyle,
                served.tier,
                quantities,
                self.calculator.price(model, &quantities),
                Some(UsageArtifact::StyleGuide(guide.id)),
            )
        });

        self.repository.update(&guide, usage.as_ref()).await?;
        info!(tier = %served.tier, "Style guide generated");
        Ok(guide)
    }
}

fn not_found(id: StyleGuideId) -> ServiceError {
    ServiceError::NotFound(format!("style guide {id} not found"))
}
