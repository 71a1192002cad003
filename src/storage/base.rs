use crate::core::ScrapeRecord;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum StorageError {
    #[error("Storage operation failed: {0}")]
    OperationError(String),

    #[error("Serialization failed: {0}")]
    SerializationError(String),
}

impl From<std::io::Error> for StorageError {
    fn from(error: std::io::Error) -> Self {
        StorageError::OperationError(error.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(error: serde_json::Error) -> Self {
        StorageError::SerializationError(error.to_string())
    }
}

impl From<csv::Error> for StorageError {
    fn from(error: csv::Error) -> Self {
        if error.is_io_error() {
            StorageError::OperationError(error.to_string())
        } else {
            StorageError::SerializationError(error.to_string())
        }
    }
}

/// An append-only destination for scrape records.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    fn name(&self) -> String;

    /// One-time setup before the first record of a run.
    async fn prepare(&self) -> Result<(), StorageError> {
        Ok(())
    }

    async fn store(&self, record: &ScrapeRecord) -> Result<(), StorageError>;
}
