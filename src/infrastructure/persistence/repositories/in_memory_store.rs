use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::application::ports::{
    ImageGenerationRepository, RepositoryError, StyleGuideRepository, TranscriptionRepository,
    UsageRepository,
};
use crate::domain::{
    ImageGenerationId, ImageGenerationRecord, StyleGuide, StyleGuideId, Transcription,
    TranscriptionId, UsageArtifact, UsageEvent, UserId,
};

#[derive(Default)]
struct State {
    transcriptions: HashMap<TranscriptionId, Transcription>,
    style_guides: HashMap<StyleGuideId, StyleGuide>,
    images: HashMap<ImageGenerationId, ImageGenerationRecord>,
    usage: Vec<UsageEvent>,
}

impl State {
    fn drop_usage_for(&mut self, artifact: UsageArtifact) {
        self.usage.retain(|u| u.artifact != Some(artifact));
    }
}

/// Process-local implementation of every repository port.
///
/// Writes that carry a usage event apply both under one write lock, and
/// deletes mirror the database cascades.
#[derive(Default)]
pub struct InMemoryStore {
    state: RwLock<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an image record without a usage event.
    pub async fn seed_image(&self, record: ImageGenerationRecord) {
        self.state.write().await.images.insert(record.id, record);
    }

    pub async fn seed_usage(&self, usage: UsageEvent) {
        self.state.write().await.usage.push(usage);
    }

    pub async fn usage_events(&self) -> Vec<UsageEvent> {
        self.state.read().await.usage.clone()
    }
}

fn page<T: Clone>(items: Vec<&T>, skip: i64, limit: i64) -> Vec<T> {
    items
        .into_iter()
        .skip(skip.max(0) as usize)
        .take(limit.max(0) as usize)
        .cloned()
        .collect()
}

#[async_trait]
impl TranscriptionRepository for InMemoryStore {
    async fn create(
        &self,
        transcription: &Transcription,
        usage: Option<&UsageEvent>,
    ) -> Result<(), RepositoryError> {
        let mut state = self.state.write().await;
        if state.transcriptions.contains_key(&transcription.id) {
            return Err(RepositoryError::ConstraintViolation(format!(
                "duplicate transcription {}",
                transcription.id
            )));
        }
        state
            .transcriptions
            .insert(transcription.id, transcription.clone());
        state.usage.extend(usage.cloned());
        Ok(())
    }

    async fn get(
        &self,
        id: TranscriptionId,
        user_id: UserId,
    ) -> Result<Option<Transcription>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state
            .transcriptions
            .get(&id)
            .filter(|t| t.user_id == user_id)
            .cloned())
    }

    async fn list(
        &self,
        user_id: UserId,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<Transcription>, RepositoryError> {
        let state = self.state.read().await;
        let mut items: Vec<&Transcription> = state
            .transcriptions
            .values()
            .filter(|t| t.user_id == user_id)
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(page(items, skip, limit))
    }

    async fn count(&self, user_id: UserId) -> Result<i64, RepositoryError> {
        let state = self.state.read().await;
        Ok(state
            .transcriptions
            .values()
            .filter(|t| t.user_id == user_id)
            .count() as i64)
    }

    async fn update(
        &self,
        transcription: &Transcription,
        usage: Option<&UsageEvent>,
    ) -> Result<(), RepositoryError> {
        let mut state = self.state.write().await;
        match state.transcriptions.get_mut(&transcription.id) {
            Some(existing) if existing.user_id == transcription.user_id => {
                *existing = transcription.clone();
            }
            _ => return Err(RepositoryError::NotFound(transcription.id.to_string())),
        }
        state.usage.extend(usage.cloned());
        Ok(())
    }

    async fn delete(&self, id: TranscriptionId, user_id: UserId) -> Result<bool, RepositoryError> {
        let mut state = self.state.write().await;
        let owned = state
            .transcriptions
            .get(&id)
            .is_some_and(|t| t.user_id == user_id);
        if !owned {
            return Ok(false);
        }
        state.transcriptions.remove(&id);
        state.drop_usage_for(UsageArtifact::Transcription(id));
        for image in state.images.values_mut() {
            if image.transcription_id == Some(id) {
                image.transcription_id = None;
            }
        }
        Ok(true)
    }
}

#[async_trait]
impl StyleGuideRepository for InMemoryStore {
    async fn create(&self, guide: &StyleGuide) -> Result<(), RepositoryError> {
        let mut state = self.state.write().await;
        state.style_guides.insert(guide.id, guide.clone());
        Ok(())
    }

    async fn get(
        &self,
        id: StyleGuideId,
        user_id: UserId,
    ) -> Result<Option<StyleGuide>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state
            .style_guides
            .get(&id)
            .filter(|g| g.user_id == user_id)
            .cloned())
    }

    async fn list(&self, user_id: UserId) -> Result<Vec<StyleGuide>, RepositoryError> {
        let state = self.state.read().await;
        let mut guides: Vec<StyleGuide> = state
            .style_guides
            .values()
            .filter(|g| g.user_id == user_id)
            .cloned()
            .collect();
        guides.sort_by(|a, b| {
            b.is_default
                .cmp(&a.is_default)
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(guides)
    }

    async fn update(
        &self,
        guide: &StyleGuide,
        usage: Option<&UsageEvent>,
    ) -> Result<(), RepositoryError> {
        let mut state = self.state.write().await;
        match state.style_guides.get_mut(&guide.id) {
            Some(existing) if existing.user_id == guide.user_id => {
                let is_default = existing.is_default;
                *existing = guide.clone();
                existing.is_default = is_default;
            }
            _ => return Err(RepositoryError::NotFound(guide.id.to_string())),
        }
        state.usage.extend(usage.cloned());
        Ok(())
    }

    async fn delete(&self, id: StyleGuideId, user_id: UserId) -> Result<bool, RepositoryError> {
        let mut state = self.state.write().await;
        let owned = state
            .style_guides
            .get(&id)
            .is_some_and(|g| g.user_id == user_id);
        if owned {
            state.style_guides.remove(&id);
            state.drop_usage_for(UsageArtifact::StyleGuide(id));
        }
        Ok(owned)
    }

    async fn set_default(&self, id: StyleGuideId, user_id: UserId) -> Result<(), RepositoryError> {
        let mut state = self.state.write().await;
        let owned = state
            .style_guides
            .get(&id)
            .is_some_and(|g| g.user_id == user_id);
        if !owned {
            return Err(RepositoryError::NotFound(id.to_string()));
        }
        for guide in state.style_guides.values_mut() {
            if guide.user_id == user_id {
                guide.is_default = guide.id == id;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl ImageGenerationRepository for InMemoryStore {
    async fn create(
        &self,
        record: &ImageGenerationRecord,
        usage: &UsageEvent,
    ) -> Result<(), RepositoryError> {
        let mut state = self.state.write().await;
        state.images.insert(record.id, record.clone());
        state.usage.push(usage.clone());
        Ok(())
    }

    async fn get(
        &self,
        id: ImageGenerationId,
        user_id: UserId,
    ) -> Result<Option<ImageGenerationRecord>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state
            .images
            .get(&id)
            .filter(|r| r.user_id == user_id)
            .cloned())
    }

    async fn list(
        &self,
        user_id: UserId,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<ImageGenerationRecord>, RepositoryError> {
        let state = self.state.read().await;
        let mut items: Vec<&ImageGenerationRecord> = state
            .images
            .values()
            .filter(|r| r.user_id == user_id)
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(page(items, skip, limit))
    }

    async fn count(&self, user_id: UserId) -> Result<i64, RepositoryError> {
        let state = self.state.read().await;
        Ok(state.images.values().filter(|r| r.user_id == user_id).count() as i64)
    }

    async fn list_for_transcription(
        &self,
        user_id: UserId,
        transcription_id: TranscriptionId,
    ) -> Result<Vec<ImageGenerationRecord>, RepositoryError> {
        let state = self.state.read().await;
        let mut items: Vec<ImageGenerationRecord> = state
            .images
            .values()
            .filter(|r| r.user_id == user_id && r.transcription_id == Some(transcription_id))
            .cloned()
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }

    async fn delete(
        &self,
        id: ImageGenerationId,
        user_id: UserId,
    ) -> Result<bool, RepositoryError> {
        let mut state = self.state.write().await;
        let owned = state.images.get(&id).is_some_and(|r| r.user_id == user_id);
        if !owned {
            return Ok(false);
        }
        state.images.remove(&id);
        state.drop_usage_for(UsageArtifact::ImageGeneration(id));
        for image in state.images.values_mut() {
            if image.parent_id == Some(id) {
                image.parent_id = None;
            }
        }
        Ok(true)
    }
}

#[async_trait]
impl UsageRepository for InMemoryStore {
    async fn list(
        &self,
        user_id: UserId,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<UsageEvent>, RepositoryError> {
        let state = self.state.read().await;
        let mut items: Vec<&UsageEvent> =
            state.usage.iter().filter(|u| u.user_id == user_id).collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(page(items, skip, limit))
    }

    async fn all_for_user(&self, user_id: UserId) -> Result<Vec<UsageEvent>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state
            .usage
            .iter()
            .filter(|u| u.user_id == user_id)
            .cloned()
            .collect())
    }
}
