use crate::application::ports::{AudioStoreError, RepositoryError};

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    UnsupportedMedia(String),
    #[error("{0}")]
    PayloadTooLarge(String),
    #[error("{0}")]
    Provider(String),
    #[error("repository: {0}")]
    Repository(RepositoryError),
    #[error("storage: {0}")]
    Storage(#[from] AudioStoreError),
}

impl From<RepositoryError> for ServiceError {
    fn from(error: RepositoryError) -> Self {
        match error {
            // a row removed between read and write
            RepositoryError::NotFound(what) => ServiceError::NotFound(format!("{what} not found")),
            other => ServiceError::Repository(other),
        }
    }
}
