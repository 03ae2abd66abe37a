//! Storage backend selection and connection settings.

use crate::StorageError;

/// Default region when `S3_REGION` is not set.
const DEFAULT_REGION: &str = "us-east-1";

/// Base URL the in-memory backend reports for public objects.
const MEMORY_PUBLIC_URL: &str = "memory://public";

/// Which [`crate::ObjectStore`] implementation to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackendType {
    S3,
    Memory,
}

impl StorageBackendType {
    /// Parse from the `STORAGE_BACKEND` value.
    pub fn from_name(name: &str) -> Result<Self, StorageError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "s3" => Ok(Self::S3),
            "memory" => Ok(Self::Memory),
            other => Err(StorageError::Config(format!(
                "Unknown storage backend '{other}'. Must be one of: s3, memory"
            ))),
        }
    }
}

/// Connection settings for object storage.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackendType,
    /// Custom S3 endpoint (MinIO, Supabase, R2 ...). `None` means AWS.
    pub endpoint: Option<String>,
    pub region: String,
    /// Static credentials. When absent the default AWS provider chain is used.
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    /// Prefix for public object URLs: `{public_base_url}/{bucket}/{path}`.
    pub public_base_url: String,
}

impl StorageConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable               | Default                                   |
    /// |------------------------|-------------------------------------------|
    /// | `STORAGE_BACKEND`      | `s3`                                      |
    /// | `S3_ENDPOINT`          | none (AWS)                                |
    /// | `S3_REGION`            | `us-east-1`                               |
    /// | `S3_ACCESS_KEY_ID`     | none                                      |
    /// | `S3_SECRET_ACCESS_KEY` | none                                      |
    /// | `STORAGE_PUBLIC_URL`   | endpoint, else `https://s3.{region}.amazonaws.com` |
    pub fn from_env() -> Result<Self, StorageError> {
        let backend = StorageBackendType::from_name(
            &std::env::var("STORAGE_BACKEND").unwrap_or_else(|_| "s3".into()),
        )?;
        let endpoint = non_empty_var("S3_ENDPOINT");
        let region = non_empty_var("S3_REGION").unwrap_or_else(|| DEFAULT_REGION.to_string());
        let public_base_url = non_empty_var("STORAGE_PUBLIC_URL").unwrap_or_else(|| {
            default_public_base_url(backend, endpoint.as_deref(), &region)
        });

        Ok(Self {
            backend,
            endpoint,
            region,
            access_key_id: non_empty_var("S3_ACCESS_KEY_ID"),
            secret_access_key: non_empty_var("S3_SECRET_ACCESS_KEY"),
            public_base_url,
        })
    }

    /// In-memory configuration, handy for tests.
    pub fn memory() -> Self {
        Self {
            backend: StorageBackendType::Memory,
            endpoint: None,
            region: DEFAULT_REGION.to_string(),
            access_key_id: None,
            secret_access_key: None,
            public_base_url: MEMORY_PUBLIC_URL.to_string(),
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn default_public_base_url(
    backend: StorageBackendType,
    endpoint: Option<&str>,
    region: &str,
) -> String {
    match (backend, endpoint) {
        (StorageBackendType::Memory, _) => MEMORY_PUBLIC_URL.to_string(),
        (StorageBackendType::S3, Some(endpoint)) => endpoint.trim_end_matches('/').to_string(),
        (StorageBackendType::S3, None) => format!("https://s3.{region}.amazonaws.com"),
    }
}
