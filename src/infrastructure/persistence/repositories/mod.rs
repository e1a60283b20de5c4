mod in_memory_store;
mod pg_image_generation_repository;
mod pg_style_guide_repository;
mod pg_transcription_repository;
mod pg_usage_repository;

pub use in_memory_store::InMemoryStore;
pub use pg_image_generation_repository::PgImageGenerationRepository;
pub use pg_style_guide_repository::PgStyleGuideRepository;
pub use pg_transcription_repository::PgTranscriptionRepository;
pub use pg_usage_repository::PgUsageRepository;
