use async_trait::async_trait;

use super::RepositoryError;
use crate::domain::{UsageEvent, UserId};

/// Read side of the append-only usage log. Events are written together
/// with their artifact by the artifact repositories.
#[async_trait]
pub trait UsageRepository: Send + Sync {
    async fn list(
        &self,
        user_id: UserId,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<UsageEvent>, RepositoryError>;

    async fn all_for_user(&self, user_id: UserId) -> Result<Vec<UsageEvent>, RepositoryError>;
}
