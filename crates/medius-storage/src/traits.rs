//! Storage abstraction trait
//!
//! This module defines the `StorageManager` trait that all storage backends
//! must implement. The provider set is closed and small; adding a backend
//! means implementing these three operations and extending the factory match
//! in `context`.

use async_trait::async_trait;
use bytes::Bytes;
use medius_core::MediaType;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage {0} not found")]
    StorageNotFound(Uuid),

    #[error("No default storage configured")]
    NoDefaultStorage,

    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Link generation failed: {0}")]
    LinkFailed(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// One configured storage backend.
///
/// Backend failures (network, credentials) surface unmodified in the error
/// message; no retry or timeout layer lives here.
#[async_trait]
pub trait StorageManager: Send + Sync {
    /// Id of the storage this manager serves.
    fn storage_id(&self) -> Uuid;

    /// Write `content` under a freshly generated object key and return the
    /// key as the file identifier.
    async fn save(
        &self,
        media_type: MediaType,
        owner_id: Uuid,
        filename: &str,
        content: Bytes,
        content_type: &str,
    ) -> StorageResult<String>;

    /// Delete the object behind `file_identifier`. Backend semantics for a
    /// missing key are passed through, not special-cased.
    async fn delete(&self, file_identifier: &str) -> StorageResult<()>;

    /// Issue a time-limited signed URL granting read access to the object.
    async fn link(&self, file_identifier: &str, expires_in: Duration) -> StorageResult<String>;
}
