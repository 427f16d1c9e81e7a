//! Storage abstraction trait
//!
//! This module defines the Storage trait that byte-store backends implement.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Write-only byte store for raw uploads, keyed by generated storage name.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Store `data` under `storage_key` and return (storage_key, storage_path).
    ///
    /// The storage_path is where the backend placed the bytes and is recorded
    /// alongside the prediction.
    async fn upload(
        &self,
        storage_key: &str,
        content_type: &str,
        data: Bytes,
    ) -> StorageResult<(String, String)>;
}
