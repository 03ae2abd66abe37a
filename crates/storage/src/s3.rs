//! S3-compatible backend.

use std::time::Duration;

use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::{Builder, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use bytes::Bytes;

use crate::config::StorageConfig;
use crate::{join_url, ObjectStore, StorageError};

/// HTTP status S3 answers with when `If-None-Match: *` finds an object.
const PRECONDITION_FAILED: u16 = 412;

/// Object store backed by an S3-compatible service.
pub struct S3Store {
    client: Client,
    http: reqwest::Client,
    public_base_url: String,
}

impl S3Store {
    /// Build an S3 client from `config`.
    ///
    /// Static keys are used when both are set; otherwise the default AWS
    /// provider chain resolves credentials. A custom endpoint switches to
    /// path-style addressing.
    pub async fn connect(config: &StorageConfig) -> Result<Self, StorageError> {
        let region = Region::new(config.region.clone());

        let builder = match (&config.access_key_id, &config.secret_access_key) {
            (Some(key), Some(secret)) => Builder::new()
                .behavior_version(BehaviorVersion::latest())
                .region(region)
                .credentials_provider(Credentials::new(key, secret, None, None, "restyle-env")),
            (None, None) => {
                let shared = aws_config::defaults(BehaviorVersion::latest())
                    .region(region)
                    .load()
                    .await;
                Builder::from(&shared)
            }
            _ => {
                return Err(StorageError::Config(
                    "S3_ACCESS_KEY_ID and S3_SECRET_ACCESS_KEY must be set together".into(),
                ))
            }
        };

        let builder = match &config.endpoint {
            Some(endpoint) => builder.endpoint_url(endpoint).force_path_style(true),
            None => builder,
        };

        Ok(Self {
            client: Client::from_conf(builder.build()),
            http: reqwest::Client::new(),
            public_base_url: config.public_base_url.clone(),
        })
    }
}

#[async_trait::async_trait]
impl ObjectStore for S3Store {
    async fn signed_url(
        &self,
        bucket: &str,
        path: &str,
        expires_in: Duration,
    ) -> Result<String, StorageError> {
        let presigning = PresigningConfig::expires_in(expires_in).map_err(|e| StorageError::S3 {
            operation: "presign",
            message: e.to_string(),
        })?;

        let request = self
            .client
            .get_object()
            .bucket(bucket)
            .key(path)
            .presigned(presigning)
            .await
            .map_err(|e| StorageError::S3 {
                operation: "presign GetObject",
                message: DisplayErrorContext(&e).to_string(),
            })?;

        Ok(request.uri().to_string())
    }

    async fn fetch_signed(
        &self,
        bucket: &str,
        path: &str,
        expires_in: Duration,
    ) -> Result<Vec<u8>, StorageError> {
        let url = self.signed_url(bucket, path, expires_in).await?;

        let response = self.http.get(url).send().await?;
        let status = response.status();
        if status.as_u16() == 404 {
            return Err(StorageError::NotFound {
                bucket: bucket.to_string(),
                path: path.to_string(),
            });
        }
        if !status.is_success() {
            return Err(StorageError::HttpStatus(status.as_u16()));
        }

        let body = response.bytes().await?;
        tracing::debug!(bucket, path, bytes = body.len(), "Fetched object via signed URL");
        Ok(body.to_vec())
    }

    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let size = data.len();
        let result = self
            .client
            .put_object()
            .bucket(bucket)
            .key(path)
            .content_type(content_type)
            .if_none_match("*")
            .body(ByteStream::from(data))
            .send()
            .await;

        match result {
            Ok(_) => {
                tracing::debug!(bucket, path, bytes = size, "Uploaded object");
                Ok(())
            }
            Err(err)
                if err.raw_response().map(|r| r.status().as_u16())
                    == Some(PRECONDITION_FAILED) =>
            {
                Err(StorageError::AlreadyExists {
                    bucket: bucket.to_string(),
                    path: path.to_string(),
                })
            }
            Err(err) => Err(StorageError::S3 {
                operation: "PutObject",
                message: DisplayErrorContext(&err).to_string(),
            }),
        }
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        join_url(&self.public_base_url, bucket, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageBackendType;

    fn config() -> StorageConfig {
        StorageConfig {
            backend: StorageBackendType::S3,
            endpoint: Some("http://127.0.0.1:9000".into()),
            region: "us-east-1".into(),
            access_key_id: Some("test-key".into()),
            secret_access_key: Some("test-secret".into()),
            public_base_url: "https://cdn.example.com/storage/v1/object/public".into(),
        }
    }

    #[tokio::test]
    async fn public_url_is_base_bucket_path() {
        let store = S3Store::connect(&config()).await.unwrap();
        assert_eq!(
            store.public_url("renders-preview-small", "renders-preview-small/u/j.png"),
            "https://cdn.example.com/storage/v1/object/public/renders-preview-small/renders-preview-small/u/j.png"
        );
    }

    #[tokio::test]
    async fn signed_url_is_presigned_against_endpoint() {
        let store = S3Store::connect(&config()).await.unwrap();
        let url = store
            .signed_url("uploads-original", "u/in.png", Duration::from_secs(900))
            .await
            .unwrap();
        assert!(url.starts_with("http://127.0.0.1:9000/uploads-original/u/in.png?"));
        assert!(url.contains("X-Amz-Expires=900"));
        assert!(url.contains("X-Amz-Signature="));
    }

    #[tokio::test]
    async fn half_configured_credentials_are_rejected() {
        let mut config = config();
        config.secret_access_key = None;
        let err = S3Store::connect(&config).await.err().unwrap();
        assert!(matches!(err, StorageError::Config(_)));
    }
}
