use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection, PgPool};
use tracing::instrument;
use uuid::Uuid;

use crate::application::ports::{RepositoryError, UsageRepository};
use crate::domain::{
    ImageGenerationId, ImageResolution, Operation, StyleGuideId, TranscriptionId, UsageArtifact,
    UsageEvent, UsageEventId, UsageQuantities, UserId,
};

const USAGE_COLUMNS: &str = "id, user_id, provider, model, operation, api_tier, audio_seconds, \
     input_tokens, output_tokens, images_generated, image_resolution, cost_usd, \
     transcription_id, style_guide_id, image_generation_id, created_at";

pub struct PgUsageRepository {
    pool: PgPool,
}

impl PgUsageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct UsageRow {
    id: Uuid,
    user_id: Uuid,
    provider: String,
    model: String,
    operation: String,
    api_tier: String,
    audio_seconds: Option<f64>,
    input_tokens: Option<i64>,
    output_tokens: Option<i64>,
    images_generated: Option<i32>,
    image_resolution: Option<String>,
    cost_usd: f64,
    transcription_id: Option<Uuid>,
    style_guide_id: Option<Uuid>,
    image_generation_id: Option<Uuid>,
    created_at: DateTime<Utc>,
}

impl TryFrom<UsageRow> for UsageEvent {
    type Error = RepositoryError;

    fn try_from(r: UsageRow) -> Result<Self, Self::Error> {
        let operation = r
            .operation
            .parse::<Operation>()
            .map_err(RepositoryError::QueryFailed)?;
        let tier = r.api_tier.parse().map_err(RepositoryError::QueryFailed)?;

        let input_tokens = r.input_tokens.unwrap_or(0);
        let output_tokens = r.output_tokens.unwrap_or(0);
        let quantities = match operation {
            Operation::Transcribe => UsageQuantities::Audio {
                seconds: r.audio_seconds.unwrap_or(0.0),
            },
            Operation::GenerateImage => UsageQuantities::Image {
                input_tokens,
                output_tokens,
                images_generated: r.images_generated.unwrap_or(0),
                resolution: ImageResolution::parse_or_default(
                    r.image_resolution.as_deref().unwrap_or_default(),
                ),
            },
            Operation::Process | Operation::GenerateStyle => UsageQuantities::Tokens {
                input_tokens,
                output_tokens,
            },
        };

        let artifact = r
            .transcription_id
            .map(|id| UsageArtifact::Transcription(TranscriptionId::from_uuid(id)))
            .or_else(|| {
                r.style_guide_id
                    .map(|id| UsageArtifact::StyleGuide(StyleGuideId::from_uuid(id)))
            })
            .or_else(|| {
                r.image_generation_id
                    .map(|id| UsageArtifact::ImageGeneration(ImageGenerationId::from_uuid(id)))
            });

        Ok(UsageEvent {
            id: UsageEventId::from_uuid(r.id),
            user_id: UserId::from_uuid(r.user_id),
            provider: r.provider,
            model: r.model,
            operation,
            tier,
            quantities,
            cost_usd: r.cost_usd,
            artifact,
            created_at: r.created_at,
        })
    }
}

/// Appends a usage event on the given connection, normally inside the
/// transaction that writes its artifact.
pub(super) async fn insert_usage(
    conn: &mut PgConnection,
    usage: &UsageEvent,
) -> Result<(), RepositoryError> {
    let q = &usage.quantities;
    sqlx::query(
        r#"
        INSERT INTO api_usage (id, user_id, provider, model, operation, api_tier, audio_seconds,
            input_tokens, output_tokens, images_generated, image_resolution, cost_usd,
            transcription_id, style_guide_id, image_generation_id, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
        "#,
    )
    .bind(usage.id.as_uuid())
    .bind(usage.user_id.as_uuid())
    .bind(&usage.provider)
    .bind(&usage.model)
    .bind(usage.operation.as_str())
    .bind(usage.tier.as_str())
    .bind(q.audio_seconds())
    .bind(q.input_tokens())
    .bind(q.output_tokens())
    .bind(q.images_generated())
    .bind(q.image_resolution().map(|r| r.as_str()))
    .bind(usage.cost_usd)
    .bind(usage.transcription_id().map(|id| id.as_uuid()))
    .bind(usage.style_guide_id().map(|id| id.as_uuid()))
    .bind(usage.image_generation_id().map(|id| id.as_uuid()))
    .bind(usage.created_at)
    .execute(&mut *conn)
    .await
    .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

    Ok(())
}

#[async_trait]
impl UsageRepository for PgUsageRepository {
    #[instrument(skip(self), fields(user = %user_id))]
    async fn list(
        &self,
        user_id: UserId,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<UsageEvent>, RepositoryError> {
        let rows: Vec<UsageRow> = sqlx::query_as(&format!(
            "SELECT {USAGE_COLUMNS} FROM api_usage WHERE user_id = $1 \
             ORDER BY created_at DESC OFFSET $2 LIMIT $3"
        ))
        .bind(user_id.as_uuid())
        .bind(skip)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        rows.into_iter().map(UsageEvent::try_from).collect()
    }

    #[instrument(skip(self), fields(user = %user_id))]
    async fn all_for_user(&self, user_id: UserId) -> Result<Vec<UsageEvent>, RepositoryError> {
        let rows: Vec<UsageRow> = sqlx::query_as(&format!(
            "SELECT {USAGE_COLUMNS} FROM api_usage WHERE user_id = $1 ORDER BY created_at"
        ))
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        rows.into_iter().map(UsageEvent::try_from).collect()
    }
}
