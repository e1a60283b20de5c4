use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::instrument;
use uuid::Uuid;

use super::pg_usage_repository::insert_usage;
use crate::application::ports::{RepositoryError, StyleGuideRepository};
use crate::domain::{StyleGuide, StyleGuideId, UsageEvent, UserId};

const STYLE_GUIDE_COLUMNS: &str = "id, user_id, name, description, examples, guide_content, \
     is_default, created_at, updated_at";

pub struct PgStyleGuideRepository {
    pool: PgPool,
}

impl PgStyleGuideRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct StyleGuideRow {
    id: Uuid,
    user_id: Uuid,
    name: String,
    description: Option<String>,
    examples: Option<String>,
    guide_content: Option<String>,
    is_default: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<StyleGuideRow> for StyleGuide {
    fn from(r: StyleGuideRow) -> Self {
        Self {
            id: StyleGuideId::from_uuid(r.id),
            user_id: UserId::from_uuid(r.user_id),
            name: r.name,
            description: r.description,
            examples: r.examples,
            guide_content: r.guide_content,
            is_default: r.is_default,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

fn query_failed(e: sqlx::Error) -> RepositoryError {
    RepositoryError::QueryFailed(e.to_string())
}

#[async_trait]
impl StyleGuideRepository for PgStyleGuideRepository {
    #[instrument(skip(self, guide), fields(style_guide = %guide.id))]
    async fn create(&self, guide: &StyleGuide) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO style_guides (id, user_id, name, description, examples, guide_content,
                is_default, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(guide.id.as_uuid())
        .bind(guide.user_id.as_uuid())
        .bind(&guide.name)
        .bind(&guide.description)
        .bind(&guide.examples)
        .bind(&guide.guide_content)
        .bind(guide.is_default)
        .bind(guide.created_at)
        .bind(guide.updated_at)
        .execute(&self.pool)
        .await
        .map_err(query_failed)?;

        Ok(())
    }

    async fn get(
        &self,
        id: StyleGuideId,
        user_id: UserId,
    ) -> Result<Option<StyleGuide>, RepositoryError> {
        let row: Option<StyleGuideRow> = sqlx::query_as(&format!(
            "SELECT {STYLE_GUIDE_COLUMNS} FROM style_guides WHERE id = $1 AND user_id = $2"
        ))
        .bind(id.as_uuid())
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(query_failed)?;

        Ok(row.map(StyleGuide::from))
    }

    #[instrument(skip(self), fields(user = %user_id))]
    async fn list(&self, user_id: UserId) -> Result<Vec<StyleGuide>, RepositoryError> {
        let rows: Vec<StyleGuideRow> = sqlx::query_as(&format!(
            "SELECT {STYLE_GUIDE_COLUMNS} FROM style_guides WHERE user_id = $1 \
             ORDER BY is_default DESC, name"
        ))
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(query_failed)?;

        Ok(rows.into_iter().map(StyleGuide::from).collect())
    }

    #[instrument(skip(self, guide, usage), fields(style_guide = %guide.id))]
    async fn update(
        &self,
        guide: &StyleGuide,
        usage: Option<&UsageEvent>,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(query_failed)?;

        let result = sqlx::query(
            r#"
            UPDATE style_guides
            SET name = $1, description = $2, examples = $3, guide_content = $4, updated_at = $5
            WHERE id = $6 AND user_id = $7
            "#,
        )
        .bind(&guide.name)
        .bind(&guide.description)
        .bind(&guide.examples)
        .bind(&guide.guide_content)
        .bind(guide.updated_at)
        .bind(guide.id.as_uuid())
        .bind(guide.user_id.as_uuid())
        .execute(&mut *tx)
        .await
        .map_err(query_failed)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(guide.id.to_string()));
        }

        if let Some(usage) = usage {
            insert_usage(&mut tx, usage).await?;
        }

        tx.commit().await.map_err(query_failed)
    }

    #[instrument(skip(self), fields(style_guide = %id, user = %user_id))]
    async fn delete(&self, id: StyleGuideId, user_id: UserId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM style_guides WHERE id = $1 AND user_id = $2")
            .bind(id.as_uuid())
            .bind(user_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(query_failed)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), fields(style_guide = %id, user = %user_id))]
    async fn set_default(&self, id: StyleGuideId, user_id: UserId) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(query_failed)?;

        sqlx::query("UPDATE style_guides SET is_default = FALSE WHERE user_id = $1 AND is_default")
            .bind(user_id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(query_failed)?;

        let result = sqlx::query(
            "UPDATE style_guides SET is_default = TRUE, updated_at = NOW() \
             WHERE id = $1 AND user_id = $2",
        )
        .bind(id.as_uuid())
        .bind(user_id.as_uuid())
        .execute(&mut *tx)
        .await
        .map_err(query_failed)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(id.to_string()));
        }

        tx.commit().await.map_err(query_failed)
    }
}
