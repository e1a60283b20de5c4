mod api_credential;
mod audio_store;
mod content_response;
mod image_generation_repository;
mod image_generator;
mod provider_error;
mod repository_error;
mod style_guide_repository;
mod text_generator;
mod transcription_engine;
mod transcription_repository;
mod usage_repository;

pub use api_credential::ApiCredential;
pub use audio_store::{AudioStore, AudioStoreError};
pub use content_response::{Candidate, ContentPart, ContentResponse, PromptFeedback, UsageMetadata};
pub use image_generation_repository::ImageGenerationRepository;
pub use image_generator::{ImageGenerationRequest, ImageGenerator};
pub use provider_error::ProviderError;
pub use repository_error::RepositoryError;
pub use style_guide_repository::StyleGuideRepository;
pub use text_generator::{SamplingParams, TextGenerationRequest, TextGenerator};
pub use transcription_engine::{RawTranscript, TranscriptionEngine, TranscriptionRequest};
pub use transcription_repository::TranscriptionRepository;
pub use usage_repository::UsageRepository;
