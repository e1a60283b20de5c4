use bytes::Bytes;

use crate::domain::StoragePath;

#[async_trait::async_trait]
pub trait AudioStore: Send + Sync {
    async fn store(&self, path: &StoragePath, data: Bytes) -> Result<u64, AudioStoreError>;

    async fn fetch(&self, path: &StoragePath) -> Result<Bytes, AudioStoreError>;

    async fn delete(&self, path: &StoragePath) -> Result<(), AudioStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AudioStoreError {
    #[error("upload failed: {0}")]
    UploadFailed(String),
    #[error("object not found: {0}")]
    NotFound(String),
    #[error("download failed: {0}")]
    DownloadFailed(String),
    #[error("delete failed: {0}")]
    DeleteFailed(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
