//! Object storage for original uploads and generated renders.
//!
//! [`ObjectStore`] is the seam the pipeline talks to. Two backends exist:
//!
//! - [`S3Store`] for any S3-compatible service (presigned reads,
//!   conditional `If-None-Match: *` writes).
//! - [`MemoryStore`] keeping objects in process, for tests and local runs.
//!
//! Writes never overwrite: an existing object at the same path yields
//! [`StorageError::AlreadyExists`]. There is no delete, list or versioning.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;

pub mod config;
pub mod memory;
pub mod s3;

pub use config::{StorageBackendType, StorageConfig};
pub use memory::MemoryStore;
pub use s3::S3Store;

/// Errors from the storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// An object already exists at the target path.
    #[error("Object already exists: {bucket}/{path}")]
    AlreadyExists { bucket: String, path: String },

    /// No object exists at the requested path.
    #[error("Object not found: {bucket}/{path}")]
    NotFound { bucket: String, path: String },

    /// An S3 API call failed.
    #[error("S3 {operation} failed: {message}")]
    S3 {
        operation: &'static str,
        message: String,
    },

    /// Fetching a signed URL failed at the transport level.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Fetching a signed URL returned a non-2xx status.
    #[error("Signed URL fetch returned HTTP {0}")]
    HttpStatus(u16),

    /// The backend is misconfigured.
    #[error("Storage configuration error: {0}")]
    Config(String),
}

/// Read/write access to bucketed objects.
#[async_trait::async_trait]
pub trait ObjectStore: Send + Sync {
    /// Time-limited read URL for a private object.
    async fn signed_url(
        &self,
        bucket: &str,
        path: &str,
        expires_in: Duration,
    ) -> Result<String, StorageError>;

    /// Obtain a signed URL for the object and download its bytes through it.
    async fn fetch_signed(
        &self,
        bucket: &str,
        path: &str,
        expires_in: Duration,
    ) -> Result<Vec<u8>, StorageError>;

    /// Store `data` at `path`, failing if something is already there.
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<(), StorageError>;

    /// Public URL of an object in a publicly readable bucket.
    fn public_url(&self, bucket: &str, path: &str) -> String;
}

/// Build the backend selected by `config`.
pub async fn connect(config: &StorageConfig) -> Result<Arc<dyn ObjectStore>, StorageError> {
    match config.backend {
        StorageBackendType::S3 => {
            let store = S3Store::connect(config).await?;
            tracing::info!(
                endpoint = config.endpoint.as_deref().unwrap_or("aws"),
                region = %config.region,
                "S3 object store ready"
            );
            Ok(Arc::new(store))
        }
        StorageBackendType::Memory => {
            tracing::warn!("Using in-memory object store; objects vanish on exit");
            Ok(Arc::new(MemoryStore::new(config.public_base_url.clone())))
        }
    }
}

/// Join a base URL, a bucket and an object path with single slashes.
pub(crate) fn join_url(base: &str, bucket: &str, path: &str) -> String {
    format!(
        "{}/{}/{}",
        base.trim_end_matches('/'),
        bucket.trim_matches('/'),
        path.trim_start_matches('/')
    )
}
