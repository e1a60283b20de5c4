mod pg_pool;
mod repositories;

pub use repositories::{
    InMemoryStore, PgImageGenerationRepository, PgStyleGuideRepository,
    PgTranscriptionRepository, PgUsageRepository,
};

pub use pg_pool::{create_pool, run_migrations};
