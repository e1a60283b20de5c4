use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;

use diktat::application::ports::{
    ImageGenerationRepository, StyleGuideRepository, TranscriptionRepository, UsageRepository,
};
use diktat::application::services::{
    CostCalculator, DisplayCurrency, ImageGenerationService, PricingTable, StyleGuideService,
    TextProcessingService, TierSelector, TranscriptionOptions, TranscriptionService,
    UsageService,
};
use diktat::infrastructure::audio::OpenAiWhisperEngine;
use diktat::infrastructure::llm::{GeminiClient, GeminiImageGenerator, GeminiTextGenerator};
use diktat::infrastructure::observability::{TracingConfig, init_tracing};
use diktat::infrastructure::persistence::{
    InMemoryStore, PgImageGenerationRepository, PgStyleGuideRepository,
    PgTranscriptionRepository, PgUsageRepository, create_pool, run_migrations,
};
use diktat::infrastructure::storage::LocalAudioStore;
use diktat::presentation::config::{DatabaseSettings, TierKeys};
use diktat::presentation::{AppState, Environment, Settings, create_router};

struct Repositories {
    transcriptions: Arc<dyn TranscriptionRepository>,
    style_guides: Arc<dyn StyleGuideRepository>,
    images: Arc<dyn ImageGenerationRepository>,
    usage: Arc<dyn UsageRepository>,
}

async fn connect_repositories(database: &DatabaseSettings) -> anyhow::Result<Repositories> {
    if database.url.trim().is_empty() {
        tracing::warn!("No database url configured, using the in-memory store");
        let store = Arc::new(InMemoryStore::new());
        return Ok(Repositories {
            transcriptions: store.clone(),
            style_guides: store.clone(),
            images: store.clone(),
            usage: store,
        });
    }

    let pool = create_pool(&database.url, database.max_connections)
        .await
        .context("failed to connect to PostgreSQL")?;
    if database.run_migrations {
        run_migrations(&pool).await?;
    }

    Ok(Repositories {
        transcriptions: Arc::new(PgTranscriptionRepository::new(pool.clone())),
        style_guides: Arc::new(PgStyleGuideRepository::new(pool.clone())),
        images: Arc::new(PgImageGenerationRepository::new(pool.clone())),
        usage: Arc::new(PgUsageRepository::new(pool)),
    })
}

fn tier_selector(provider: &str, keys: TierKeys) -> TierSelector {
    let tiers = TierSelector::new(keys.free, keys.paid);
    if tiers.is_configured() {
        tracing::info!(provider, tiers = ?tiers.configured_tiers(), "Provider credentials loaded");
    } else {
        tracing::warn!(provider, "No credentials configured, calls will fail");
    }
    tiers
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let environment = Environment::from_env().map_err(anyhow::Error::msg)?;
    let settings = Settings::load(environment).context("failed to load settings")?;

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port)
        .parse()
        .context("invalid server address")?;

    init_tracing(
        &TracingConfig::new(
            environment.as_str(),
            settings.logging.enable_json,
            settings.logging.level.as_deref(),
        ),
        addr,
    );

    let repositories = connect_repositories(&settings.database).await?;
    let audio_store = Arc::new(
        LocalAudioStore::new(settings.uploads.audio_dir.clone())
            .context("failed to open audio directory")?,
    );

    let calculator = Arc::new(CostCalculator::new(
        PricingTable::default(),
        DisplayCurrency::new(
            settings.pricing.display_currency.clone(),
            settings.pricing.usd_exchange_rate,
        )?,
    ));

    let whisper_tiers = tier_selector("openai", settings.whisper.tier_keys());
    let gemini_tiers = tier_selector("gemini", settings.gemini.tier_keys());

    let gemini = GeminiClient::new(Some(settings.gemini.base_url.clone()));
    let text_generator = Arc::new(GeminiTextGenerator::new(
        gemini.clone(),
        Some(settings.gemini.text_model.clone()),
    ));
    let image_generator = Arc::new(GeminiImageGenerator::new(
        gemini,
        Some(settings.gemini.image_model.clone()),
    ));
    let whisper = Arc::new(OpenAiWhisperEngine::new(
        Some(settings.whisper.base_url.clone()),
        Some(settings.whisper.model.clone()),
    ));

    let language_hint = Some(settings.whisper.language.trim().to_string()).filter(|l| !l.is_empty());

    let state = AppState {
        transcription_service: Arc::new(TranscriptionService::new(
            whisper,
            whisper_tiers,
            Arc::clone(&repositories.transcriptions),
            audio_store,
            Arc::clone(&calculator),
            TranscriptionOptions {
                language_hint,
                max_upload_bytes: settings.uploads.max_upload_bytes,
            },
        )),
        text_processing_service: Arc::new(TextProcessingService::new(
            text_generator.clone(),
            gemini_tiers.clone(),
            Arc::clone(&repositories.transcriptions),
            Arc::clone(&repositories.style_guides),
            Arc::clone(&calculator),
        )),
        style_guide_service: Arc::new(StyleGuideService::new(
            Arc::clone(&repositories.style_guides),
            text_generator,
            gemini_tiers.clone(),
            Arc::clone(&calculator),
        )),
        image_generation_service: Arc::new(ImageGenerationService::new(
            image_generator,
            gemini_tiers,
            Arc::clone(&repositories.images),
            Arc::clone(&repositories.transcriptions),
            Arc::clone(&calculator),
        )),
        usage_service: Arc::new(UsageService::new(repositories.usage, calculator)),
        max_upload_bytes: settings.uploads.max_upload_bytes,
    };

    let router = create_router(state);

    tracing::info!(%addr, environment = %environment.as_str(), "Listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}
