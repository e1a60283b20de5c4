mod api_tier;
mod conversation_turn;
mod image_generation;
mod image_generation_id;
mod image_resolution;
mod inline_image;
mod operation;
mod storage_path;
mod style_guide;
mod style_guide_id;
mod token_usage;
mod transcription;
mod transcription_id;
mod turn_role;
mod usage_event;
mod usage_event_id;
mod user_id;

pub use api_tier::ApiTier;
pub use conversation_turn::ConversationTurn;
pub use image_generation::ImageGenerationRecord;
pub use image_generation_id::ImageGenerationId;
pub use image_resolution::ImageResolution;
pub use inline_image::{DEFAULT_IMAGE_MIME_TYPE, InlineImage};
pub use operation::Operation;
pub use storage_path::StoragePath;
pub use style_guide::StyleGuide;
pub use style_guide_id::StyleGuideId;
pub use token_usage::TokenUsage;
pub use transcription::Transcription;
pub use transcription_id::TranscriptionId;
pub use turn_role::TurnRole;
pub use usage_event::{
    PROVIDER_GEMINI, PROVIDER_OPENAI, UsageArtifact, UsageEvent, UsageQuantities,
};
pub use usage_event_id::UsageEventId;
pub use user_id::UserId;
