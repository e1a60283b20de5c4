use async_trait::async_trait;

use super::RepositoryError;
use crate::domain::{StyleGuide, StyleGuideId, UsageEvent, UserId};

#[async_trait]
pub trait StyleGuideRepository: Send + Sync {
    async fn create(&self, guide: &StyleGuide) -> Result<(), RepositoryError>;

    async fn get(
        &self,
        id: StyleGuideId,
        user_id: UserId,
    ) -> Result<Option<StyleGuide>, RepositoryError>;

    /// Default guide first, then by name.
    async fn list(&self, user_id: UserId) -> Result<Vec<StyleGuide>, RepositoryError>;

    async fn update(
        &self,
        guide: &StyleGuide,
        usage: Option<&UsageEvent>,
    ) -> Result<(), RepositoryError>;

    async fn delete(&self, id: StyleGuideId, user_id: UserId) -> Result<bool, RepositoryError>;

    /// Makes `id` the owner's only default guide.
    async fn set_default(&self, id: StyleGuideId, user_id: UserId) -> Result<(), RepositoryError>;
}
