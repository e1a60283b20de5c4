use std::collections::HashMap;

use bytes::Bytes;
use tokio::sync::RwLock;

use crate::application::ports::{AudioStore, AudioStoreError};
use crate::domain::StoragePath;

#[derive(Default)]
pub struct InMemoryAudioStore {
    objects: RwLock<HashMap<String, Bytes>>,
}

impl InMemoryAudioStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn contains(&self, path: &StoragePath) -> bool {
        self.objects.read().await.contains_key(path.as_str())
    }

    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }
}

#[async_trait::async_trait]
impl AudioStore for InMemoryAudioStore {
    async fn store(&self, path: &StoragePath, data: Bytes) -> Result<u64, AudioStoreError> {
        let size = data.len() as u64;
        self.objects
            .write()
            .await
            .insert(path.as_str().to_string(), data);
        Ok(size)
    }

    async fn fetch(&self, path: &StoragePath) -> Result<Bytes, AudioStoreError> {
        self.objects
            .read()
            .await
            .get(path.as_str())
            .cloned()
            .ok_or_else(|| AudioStoreError::NotFound(path.to_string()))
    }

    async fn delete(&self, path: &StoragePath) -> Result<(), AudioStoreError> {
        self.objects.write().await.remove(path.as_str());
        Ok(())
    }
}
