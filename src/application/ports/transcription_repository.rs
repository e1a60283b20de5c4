use async_trait::async_trait;

use super::RepositoryError;
use crate::domain::{Transcription, TranscriptionId, UsageEvent, UserId};

#[async_trait]
pub trait TranscriptionRepository: Send + Sync {
    /// Inserts the transcription and, atomically with it, its usage event.
    async fn create(
        &self,
        transcription: &Transcription,
        usage: Option<&UsageEvent>,
    ) -> Result<(), RepositoryError>;

    async fn get(
        &self,
        id: TranscriptionId,
        user_id: UserId,
    ) -> Result<Option<Transcription>, RepositoryError>;

    async fn list(
        &self,
        user_id: UserId,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<Transcription>, RepositoryError>;

    async fn count(&self, user_id: UserId) -> Result<i64, RepositoryError>;

    /// Persists the mutable fields and, atomically with them, an optional usage event.
    async fn update(
        &self,
        transcription: &Transcription,
        usage: Option<&UsageEvent>,
    ) -> Result<(), RepositoryError>;

    async fn delete(&self, id: TranscriptionId, user_id: UserId) -> Result<bool, RepositoryError>;
}
