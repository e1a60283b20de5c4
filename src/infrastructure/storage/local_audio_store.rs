use std::path::PathBuf;
use std::sync::Arc;

use bytes::Bytes;
use object_store::local::LocalFileSystem;
use object_store::path::Path as StorePath;
use object_store::{ObjectStore, PutPayload};

use crate::application::ports::{AudioStore, AudioStoreError};
use crate::domain::StoragePath;

/// Audio uploads on the local filesystem, keyed below `base_path`.
pub struct LocalAudioStore {
    inner: Arc<LocalFileSystem>,
}

impl LocalAudioStore {
    pub fn new(base_path: PathBuf) -> Result<Self, AudioStoreError> {
        std::fs::create_dir_all(&base_path).map_err(AudioStoreError::Io)?;
        let fs = LocalFileSystem::new_with_prefix(base_path)
            .map_err(|e| AudioStoreError::UploadFailed(e.to_string()))?;
        Ok(Self {
            inner: Arc::new(fs),
        })
    }
}

#[async_trait::async_trait]
impl AudioStore for LocalAudioStore {
    async fn store(&self, path: &StoragePath, data: Bytes) -> Result<u64, AudioStoreError> {
        let store_path = StorePath::from(path.as_str());
        let size = data.len() as u64;

        self.inner
            .put(&store_path, PutPayload::from(data))
            .await
            .map_err(|e| AudioStoreError::UploadFailed(e.to_string()))?;

        Ok(size)
    }

    async fn fetch(&self, path: &StoragePath) -> Result<Bytes, AudioStoreError> {
        let store_path = StorePath::from(path.as_str());
        let result = self.inner.get(&store_path).await.map_err(|e| match e {
            object_store::Error::NotFound { .. } => AudioStoreError::NotFound(path.to_string()),
            other => AudioStoreError::DownloadFailed(other.to_string()),
        })?;

        result
            .bytes()
            .await
            .map_err(|e| AudioStoreError::DownloadFailed(e.to_string()))
    }

    async fn delete(&self, path: &StoragePath) -> Result<(), AudioStoreError> {
        let store_path = StorePath::from(path.as_str());
        match self.inner.delete(&store_path).await {
            Ok(()) | Err(object_store::Error::NotFound { .. }) => Ok(()),
            Err(e) => Err(AudioStoreError::DeleteFailed(e.to_string())),
        }
    }
}
