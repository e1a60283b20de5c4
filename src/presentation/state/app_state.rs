use std::sync::Arc;

use crate::application::services::{
    ImageGenerationService, StyleGuideService, TextProcessingService, TranscriptionService,
    UsageService,
};

/// Shared handler state. Services are built once at startup and shared
/// read-only across requests.
#[derive(Clone)]
pub struct AppState {
    pub transcription_service: Arc<TranscriptionService>,
    pub text_processing_service: Arc<TextProcessingService>,
    pub style_guide_service: Arc<StyleGuideService>,
    pub image_generation_service: Arc<ImageGenerationService>,
    pub usage_service: Arc<UsageService>,
    pub max_upload_bytes: usize,
}
