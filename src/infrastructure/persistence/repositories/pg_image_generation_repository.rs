use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::instrument;
use uuid::Uuid;

use super::pg_usage_repository::insert_usage;
use crate::application::ports::{ImageGenerationRepository, RepositoryError};
use crate::domain::{
    DEFAULT_IMAGE_MIME_TYPE, ImageGenerationId, ImageGenerationRecord, InlineImage,
    TranscriptionId, UsageEvent, UserId,
};

const IMAGE_COLUMNS: &str = "id, user_id, prompt, image_data, image_mime_type, \
     continuation_token, text_response, turn_number, parent_id, transcription_id, created_at";

pub struct PgImageGenerationRepository {
    pool: PgPool,
}

impl PgImageGenerationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct ImageGenerationRow {
    id: Uuid,
    user_id: Uuid,
    prompt: String,
    image_data: Option<Vec<u8>>,
    image_mime_type: Option<String>,
    continuation_token: Option<Vec<u8>>,
    text_response: Option<String>,
    turn_number: i32,
    parent_id: Option<Uuid>,
    transcription_id: Option<Uuid>,
    created_at: DateTime<Utc>,
}

impl From<ImageGenerationRow> for ImageGenerationRecord {
    fn from(r: ImageGenerationRow) -> Self {
        let mime_type = r
            .image_mime_type
            .unwrap_or_else(|| DEFAULT_IMAGE_MIME_TYPE.to_string());
        Self {
            id: ImageGenerationId::from_uuid(r.id),
            user_id: UserId::from_uuid(r.user_id),
            prompt: r.prompt,
            image: r.image_data.map(|data| InlineImage::new(mime_type, data)),
            continuation_token: r.continuation_token,
            text_response: r.text_response,
            turn_number: r.turn_number,
            parent_id: r.parent_id.map(ImageGenerationId::from_uuid),
            transcription_id: r.transcription_id.map(TranscriptionId::from_uuid),
            created_at: r.created_at,
        }
    }
}

fn query_failed(e: sqlx::Error) -> RepositoryError {
    RepositoryError::QueryFailed(e.to_string())
}

#[async_trait]
impl ImageGenerationRepository for PgImageGenerationRepository {
    #[instrument(skip(self, record, usage), fields(image = %record.id, turn = record.turn_number))]
    async fn create(
        &self,
        record: &ImageGenerationRecord,
        usage: &UsageEvent,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(query_failed)?;

        sqlx::query(
            r#"
            INSERT INTO image_generations (id, user_id, prompt, image_data, image_mime_type,
                continuation_token, text_response, turn_number, parent_id, transcription_id,
                created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(record.id.as_uuid())
        .bind(record.user_id.as_uuid())
        .bind(&record.prompt)
        .bind(record.image.as_ref().map(|i| i.data.as_slice()))
        .bind(record.image.as_ref().map(|i| i.mime_type.as_str()))
        .bind(record.continuation_token.as_deref())
        .bind(&record.text_response)
        .bind(record.turn_number)
        .bind(record.parent_id.map(|id| id.as_uuid()))
        .bind(record.transcription_id.map(|id| id.as_uuid()))
        .bind(record.created_at)
        .execute(&mut *tx)
        .await
        .map_err(query_failed)?;

        insert_usage(&mut tx, usage).await?;

        tx.commit().await.map_err(query_failed)
    }

    async fn get(
        &self,
        id: ImageGenerationId,
        user_id: UserId,
    ) -> Result<Option<ImageGenerationRecord>, RepositoryError> {
        let row: Option<ImageGenerationRow> = sqlx::query_as(&format!(
            "SELECT {IMAGE_COLUMNS} FROM image_generations WHERE id = $1 AND user_id = $2"
        ))
        .bind(id.as_uuid())
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(query_failed)?;

        Ok(row.map(ImageGenerationRecord::from))
    }

    #[instrument(skip(self), fields(user = %user_id))]
    async fn list(
        &self,
        user_id: UserId,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<ImageGenerationRecord>, RepositoryError> {
        let rows: Vec<ImageGenerationRow> = sqlx::query_as(&format!(
            "SELECT {IMAGE_COLUMNS} FROM image_generations WHERE user_id = $1 \
             ORDER BY created_at DESC OFFSET $2 LIMIT $3"
        ))
        .bind(user_id.as_uuid())
        .bind(skip)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(query_failed)?;

        Ok(rows.into_iter().map(ImageGenerationRecord::from).collect())
    }

    async fn count(&self, user_id: UserId) -> Result<i64, RepositoryError> {
        sqlx::query_scalar("SELECT COUNT(*) FROM image_generations WHERE user_id = $1")
            .bind(user_id.as_uuid())
            .fetch_one(&self.pool)
            .await
            .map_err(query_failed)
    }

    #[instrument(skip(self), fields(user = %user_id, transcription = %transcription_id))]
    async fn list_for_transcription(
        &self,
        user_id: UserId,
        transcription_id: TranscriptionId,
    ) -> Result<Vec<ImageGenerationRecord>, RepositoryError> {
        let rows: Vec<ImageGenerationRow> = sqlx::query_as(&format!(
            "SELECT {IMAGE_COLUMNS} FROM image_generations \
             WHERE user_id = $1 AND transcription_id = $2 ORDER BY created_at DESC"
        ))
        .bind(user_id.as_uuid())
        .bind(transcription_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(query_failed)?;

        Ok(rows.into_iter().map(ImageGenerationRecord::from).collect())
    }

    #[instrument(skip(self), fields(image = %id, user = %user_id))]
    async fn delete(
        &self,
        id: ImageGenerationId,
        user_id: UserId,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM image_generations WHERE id = $1 AND user_id = $2")
            .bind(id.as_uuid())
            .bind(user_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(query_failed)?;

        Ok(result.rows_affected() > 0)
    }
}
