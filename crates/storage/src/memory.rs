//! In-process backend.

use std::collections::HashMap;
use std::time::Duration;

use bytes::Bytes;
use tokio::sync::RwLock;

use crate::{join_url, ObjectStore, StorageError};

/// An object held by [`MemoryStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub data: Bytes,
    pub content_type: String,
}

/// Object store keeping everything in a map keyed by `(bucket, path)`.
///
/// Follows the same non-overwriting rule as the S3 backend.
pub struct MemoryStore {
    objects: RwLock<HashMap<(String, String), StoredObject>>,
    public_base_url: String,
}

impl MemoryStore {
    pub fn new(public_base_url: impl Into<String>) -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
            public_base_url: public_base_url.into(),
        }
    }

    /// Read an object back.
    pub async fn get(&self, bucket: &str, path: &str) -> Option<StoredObject> {
        self.objects
            .read()
            .await
            .get(&(bucket.to_string(), path.to_string()))
            .cloned()
    }

    /// Number of stored objects across all buckets.
    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new("memory://public")
    }
}

#[async_trait::async_trait]
impl ObjectStore for MemoryStore {
    async fn signed_url(
        &self,
        bucket: &str,
        path: &str,
        expires_in: Duration,
    ) -> Result<String, StorageError> {
        if self.get(bucket, path).await.is_none() {
            return Err(StorageError::NotFound {
                bucket: bucket.to_string(),
                path: path.to_string(),
            });
        }
        let expires_at = chrono::Utc::now().timestamp() + expires_in.as_secs() as i64;
        Ok(format!("memory://{bucket}/{path}?expires={expires_at}"))
    }

    async fn fetch_signed(
        &self,
        bucket: &str,
        path: &str,
        expires_in: Duration,
    ) -> Result<Vec<u8>, StorageError> {
        self.signed_url(bucket, path, expires_in).await?;
        self.get(bucket, path)
            .await
            .map(|object| object.data.to_vec())
            .ok_or_else(|| StorageError::NotFound {
                bucket: bucket.to_string(),
                path: path.to_string(),
            })
    }

    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let mut objects = self.objects.write().await;
        let key = (bucket.to_string(), path.to_string());
        if objects.contains_key(&key) {
            return Err(StorageError::AlreadyExists {
                bucket: key.0,
                path: key.1,
            });
        }
        objects.insert(
            key,
            StoredObject {
                data,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        join_url(&self.public_base_url, bucket, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn upload_then_fetch() {
        let store = MemoryStore::default();
        store
            .upload("uploads-original", "u/in.png", Bytes::from_static(&[1, 2, 3]), "image/png")
            .await
            .unwrap();

        let data = store
            .fetch_signed("uploads-original", "u/in.png", Duration::from_secs(900))
            .await
            .unwrap();
        assert_eq!(data, vec![1, 2, 3]);
        assert_eq!(
            store.get("uploads-original", "u/in.png").await.unwrap().content_type,
            "image/png"
        );
    }

    #[tokio::test]
    async fn second_upload_to_same_path_fails() {
        let store = MemoryStore::default();
        store.upload("b", "p.png", Bytes::from_static(&[1]), "image/png").await.unwrap();

        let err = store
            .upload("b", "p.png", Bytes::from_static(&[2]), "image/png")
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::AlreadyExists { .. }));
        // Original content is untouched.
        assert_eq!(store.get("b", "p.png").await.unwrap().data, vec![1]);
    }

    #[tokio::test]
    async fn same_path_in_other_bucket_is_independent() {
        let store = MemoryStore::default();
        store.upload("a", "p.png", Bytes::from_static(&[1]), "image/png").await.unwrap();
        store.upload("b", "p.png", Bytes::from_static(&[2]), "image/png").await.unwrap();
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn missing_object_is_not_found() {
        let store = MemoryStore::default();
        let err = store
            .fetch_signed("uploads-original", "nope.png", Duration::from_secs(900))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::NotFound { .. }));
    }

    #[tokio::test]
    async fn signed_url_carries_expiry() {
        let store = MemoryStore::default();
        store.upload("b", "p.png", Bytes::from_static(&[1]), "image/png").await.unwrap();
        let url = store
            .signed_url("b", "p.png", Duration::from_secs(900))
            .await
            .unwrap();
        assert!(url.starts_with("memory://b/p.png?expires="));
    }

    #[test]
    fn public_url_uses_base() {
        let store = MemoryStore::new("https://cdn.example.com/public");
        assert_eq!(
            store.public_url("renders-preview-small", "renders-preview-small/u/j.png"),
            "https://cdn.example.com/public/renders-preview-small/renders-preview-small/u/j.png"
        );
    }
}
