use chrono::{DateTime, Utc};

use super::{
    ApiTier, ImageGenerationId, ImageResolution, Operation, StyleGuideId, TranscriptionId,
    UsageEventId, UserId,
};

pub const PROVIDER_OPENAI: &str = "openai";
pub const PROVIDER_GEMINI: &str = "gemini";

/// Billable quantities of one provider call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UsageQuantities {
    Audio {
        seconds: f64,
    },
    Tokens {
        input_tokens: i64,
        output_tokens: i64,
    },
    Image {
        input_tokens: i64,
        output_tokens: i64,
        images_generated: i32,
        resolution: ImageResolution,
    },
}

impl UsageQuantities {
    pub fn audio_seconds(&self) -> Option<f64> {
        match self {
            UsageQuantities::Audio { seconds } => Some(*seconds),
            _ => None,
        }
    }

    pub fn input_tokens(&self) -> Option<i64> {
        match self {
            UsageQuantities::Tokens { input_tokens, .. }
            | UsageQuantities::Image { input_tokens, .. } => Some(*input_tokens),
            UsageQuantities::Audio { .. } => None,
        }
    }

    pub fn output_tokens(&self) -> Option<i64> {
        match self {
            UsageQuantities::Tokens { output_tokens, .. }
            | UsageQuantities::Image { output_tokens, .. } => Some(*output_tokens),
            UsageQuantities::Audio { .. } => None,
        }
    }

    pub fn images_generated(&self) -> Option<i32> {
        match self {
            UsageQuantities::Image {
                images_generated, ..
            } => Some(*images_generated),
            _ => None,
        }
    }

    pub fn image_resolution(&self) -> Option<ImageResolution> {
        match self {
            UsageQuantities::Image { resolution, .. } => Some(*resolution),
            _ => None,
        }
    }
}

/// The artifact whose creation incurred the cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageArtifact {
    Transcription(TranscriptionId),
    StyleGuide(StyleGuideId),
    ImageGeneration(ImageGenerationId),
}

/// Immutable record of one billable API call, priced when it is created.
#[derive(Debug, Clone)]
pub struct UsageEvent {
    pub id: UsageEventId,
    pub user_id: UserId,
    pub provider: String,
    pub model: String,
    pub operation: Operation,
    pub tier: ApiTier,
    pub quantities: UsageQuantities,
    pub cost_usd: f64,
    pub artifact: Option<UsageArtifact>,
    pub created_at: DateTime<Utc>,
}

impl UsageEvent {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_id: UserId,
        provider: impl Into<String>,
        model: impl Into<String>,
        operation: Operation,
        tier: ApiTier,
        quantities: UsageQuantities,
        cost_usd: f64,
        artifact: Option<UsageArtifact>,
    ) -> Self {
        Self {
            id: UsageEventId::new(),
            user_id,
            provider: provider.into(),
            model: model.into(),
            operation,
            tier,
            quantities,
            cost_usd,
            artifact,
            created_at: Utc::now(),
        }
    }

    pub fn transcription_id(&self) -> Option<TranscriptionId> {
        match self.artifact {
            Some(UsageArtifact::Transcription(id)) => Some(id),
            _ => None,
        }
    }

    pub fn style_guide_id(&self) -> Option<StyleGuideId> {
        match self.artifact {
            Some(UsageArtifact::StyleGuide(id)) => Some(id),
            _ => None,
        }
    }

    pub fn image_generation_id(&self) -> Option<ImageGenerationId> {
        match self.artifact {
            Some(UsageArtifact::ImageGeneration(id)) => Some(id),
            _ => None,
        }
    }
}
