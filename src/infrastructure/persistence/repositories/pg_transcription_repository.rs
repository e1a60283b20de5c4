use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::instrument;
use uuid::Uuid;

use super::pg_usage_repository::insert_usage;
use crate::application::ports::{RepositoryError, TranscriptionRepository};
use crate::domain::{StoragePath, Transcription, TranscriptionId, UsageEvent, UserId};

const TRANSCRIPTION_COLUMNS: &str = "id, user_id, filename, duration_seconds, raw_text, \
     instruction, processed_text, audio_path, created_at, updated_at";

pub struct PgTranscriptionRepository {
    pool: PgPool,
}

impl PgTranscriptionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct TranscriptionRow {
    id: Uuid,
    user_id: Uuid,
    filename: Option<String>,
    duration_seconds: f64,
    raw_text: String,
    instruction: Option<String>,
    processed_text: Option<String>,
    audio_path: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<TranscriptionRow> for Transcription {
    fn from(r: TranscriptionRow) -> Self {
        Self {
            id: TranscriptionId::from_uuid(r.id),
            user_id: UserId::from_uuid(r.user_id),
            filename: r.filename,
            duration_seconds: r.duration_seconds,
            raw_text: r.raw_text,
            instruction: r.instruction,
            processed_text: r.processed_text,
            audio_path: r.audio_path.map(StoragePath::from_raw),
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

fn query_failed(e: sqlx::Error) -> RepositoryError {
    RepositoryError::QueryFailed(e.to_string())
}

#[async_trait]
impl TranscriptionRepository for PgTranscriptionRepository {
    #[instrument(skip(self, transcription, usage), fields(transcription = %transcription.id))]
    async fn create(
        &self,
        transcription: &Transcription,
        usage: Option<&UsageEvent>,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(query_failed)?;

        sqlx::query(
            r#"
            INSERT INTO transcriptions (id, user_id, filename, duration_seconds, raw_text,
                instruction, processed_text, audio_path, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(transcription.id.as_uuid())
        .bind(transcription.user_id.as_uuid())
        .bind(&transcription.filename)
        .bind(transcription.duration_seconds)
        .bind(&transcription.raw_text)
        .bind(&transcription.instruction)
        .bind(&transcription.processed_text)
        .bind(transcription.audio_path.as_ref().map(|p| p.as_str()))
        .bind(transcription.created_at)
        .bind(transcription.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(query_failed)?;

        if let Some(usage) = usage {
            insert_usage(&mut tx, usage).await?;
        }

        tx.commit().await.map_err(query_failed)
    }

    #[instrument(skip(self), fields(transcription = %id, user = %user_id))]
    async fn get(
        &self,
        id: TranscriptionId,
        user_id: UserId,
    ) -> Result<Option<Transcription>, RepositoryError> {
        let row: Option<TranscriptionRow> = sqlx::query_as(&format!(
            "SELECT {TRANSCRIPTION_COLUMNS} FROM transcriptions WHERE id = $1 AND user_id = $2"
        ))
        .bind(id.as_uuid())
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(query_failed)?;

        Ok(row.map(Transcription::from))
    }

    #[instrument(skip(self), fields(user = %user_id))]
    async fn list(
        &self,
        user_id: UserId,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<Transcription>, RepositoryError> {
        let rows: Vec<TranscriptionRow> = sqlx::query_as(&format!(
            "SELECT {TRANSCRIPTION_COLUMNS} FROM transcriptions WHERE user_id = $1 \
             ORDER BY created_at DESC OFFSET $2 LIMIT $3"
        ))
        .bind(user_id.as_uuid())
        .bind(skip)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(query_failed)?;

        Ok(rows.into_iter().map(Transcription::from).collect())
    }

    async fn count(&self, user_id: UserId) -> Result<i64, RepositoryError> {
        sqlx::query_scalar("SELECT COUNT(*) FROM transcriptions WHERE user_id = $1")
            .bind(user_id.as_uuid())
            .fetch_one(&self.pool)
            .await
            .map_err(query_failed)
    }

    #[instrument(skip(self, transcription, usage), fields(transcription = %transcription.id))]
    async fn update(
        &self,
        transcription: &Transcription,
        usage: Option<&UsageEvent>,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(query_failed)?;

        let result = sqlx::query(
            r#"
            UPDATE transcriptions
            SET raw_text = $1, instruction = $2, processed_text = $3, audio_path = $4,
                updated_at = $5
            WHERE id = $6 AND user_id = $7
            "#,
        )
        .bind(&transcription.raw_text)
        .bind(&transcription.instruction)
        .bind(&transcription.processed_text)
        .bind(transcription.audio_path.as_ref().map(|p| p.as_str()))
        .bind(transcription.updated_at)
        .bind(transcription.id.as_uuid())
        .bind(transcription.user_id.as_uuid())
        .execute(&mut *tx)
        .await
        .map_err(query_failed)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(transcription.id.to_string()));
        }

        if let Some(usage) = usage {
            insert_usage(&mut tx, usage).await?;
        }

        tx.commit().await.map_err(query_failed)
    }

    #[instrument(skip(self), fields(transcription = %id, user = %user_id))]
    async fn delete(&self, id: TranscriptionId, user_id: UserId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM transcriptions WHERE id = $1 AND user_id = $2")
            .bind(id.as_uuid())
            .bind(user_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(query_failed)?;

        Ok(result.rows_affected() > 0)
    }
}
