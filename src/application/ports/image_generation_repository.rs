use async_trait::async_trait;

use super::RepositoryError;
use crate::domain::{ImageGenerationId, ImageGenerationRecord, TranscriptionId, UsageEvent, UserId};

#[async_trait]
pub trait ImageGenerationRepository: Send + Sync {
    async fn create(
        &self,
        record: &ImageGenerationRecord,
        usage: &UsageEvent,
    ) -> Result<(), RepositoryError>;

    /// Owner-scoped lookup: records of other users are reported as absent.
    async fn get(
        &self,
        id: ImageGenerationId,
        user_id: UserId,
    ) -> Result<Option<ImageGenerationRecord>, RepositoryError>;

    async fn list(
        &self,
        user_id: UserId,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<ImageGenerationRecord>, RepositoryError>;

    async fn count(&self, user_id: UserId) -> Result<i64, RepositoryError>;

    async fn list_for_transcription(
        &self,
        user_id: UserId,
        transcription_id: TranscriptionId,
    ) -> Result<Vec<ImageGenerationRecord>, RepositoryError>;

    async fn delete(&self, id: ImageGenerationId, user_id: UserId)
    -> Result<bool, RepositoryError>;
}
