mod conversation_history;
mod cost_calculator;
mod image_generation_service;
mod pricing_table;
mod prompts;
mod provider_outcome;
mod result_normalizer;
mod service_error;
mod style_guide_service;
mod text_processing_service;
mod tier_selector;
mod transcription_service;
mod usage_aggregator;
mod usage_service;

pub use conversation_history::{ConversationHistory, MAX_HISTORY_HOPS, linearize};
pub use cost_calculator::{
    CostCalculator, CostCalculatorError, DEFAULT_DISPLAY_CURRENCY, DEFAULT_USD_EXCHANGE_RATE,
    DisplayCurrency,
};
pub use image_generation_service::{
    DEFAULT_ASPECT_RATIO, ImageGenerationService, ImageRequest, SUPPORTED_ASPECT_RATIOS,
};
pub use pricing_table::{
    AudioRate, GEMINI_IMAGE_MODEL, GEMINI_TEXT_MODEL, ImageRate, ModelRates, PricingTable,
    TokenRate, WHISPER_MODEL,
};
pub use prompts::{
    DEFAULT_TRANSCRIPTION_PROMPT, IMAGE_SYSTEM_INSTRUCTION, processing_prompt, style_guide_prompt,
};
pub use provider_outcome::{GeneratedImage, ProviderOutcome, Served, Transcript};
pub use result_normalizer::{
    EMPTY_RESPONSE_MESSAGE, EMPTY_TRANSCRIPT_MESSAGE, NO_IMAGE_MESSAGE, SAFETY_BLOCKED_PREFIX,
    normalize_image, normalize_text, normalize_transcript,
};
pub use service_error::ServiceError;
pub use style_guide_service::{STYLE_GUIDE_SAMPLING, StyleGuideChanges, StyleGuideService};
pub use text_processing_service::{PROCESSING_SAMPLING, TextProcessingService};
pub use tier_selector::{NO_CREDENTIALS_MESSAGE, TierSelector};
pub use transcription_service::{
    ALLOWED_AUDIO_EXTENSIONS, AudioUpload, DEFAULT_MAX_UPLOAD_BYTES, StoredAudio,
    TranscriptionOptions, TranscriptionService, audio_content_type, audio_suffix,
};
pub use usage_aggregator::{CostGroup, UsageAggregator, UsageSummary};
pub use usage_service::UsageService;
