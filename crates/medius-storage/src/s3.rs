//! S3 storage manager over `object_store`.

use async_trait::async_trait;
use bytes::Bytes;
use http::Method;
use medius_core::MediaType;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path;
use object_store::signer::Signer;
use object_store::{ObjectStoreExt, PutPayload, Result as ObjectResult};
use std::time::Duration;
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::config::Storage;
use crate::keys;
use crate::traits::{StorageError, StorageManager, StorageResult};

const DEFAULT_REGION: &str = "us-east-1";

/// S3 storage manager.
///
/// The underlying client is built lazily on first use behind a `OnceCell`, so
/// concurrent first-callers cannot race to create duplicate clients; once
/// built, the handle is reused for the manager's lifetime.
pub struct S3StorageManager {
    storage: Storage,
    client: OnceCell<AmazonS3>,
}

impl S3StorageManager {
    pub fn new(storage: Storage) -> Self {
        Self {
            storage,
            client: OnceCell::new(),
        }
    }

    async fn client(&self) -> StorageResult<&AmazonS3> {
        self.client
            .get_or_try_init(|| async { self.build_client() })
            .await
    }

    fn build_client(&self) -> StorageResult<AmazonS3> {
        let conf = &self.storage.s3;

        let mut builder = AmazonS3Builder::new()
            .with_bucket_name(conf.bucket_name.clone())
            .with_region(
                conf.region
                    .clone()
                    .unwrap_or_else(|| DEFAULT_REGION.to_string()),
            )
            .with_access_key_id(conf.access_key_id.clone())
            .with_secret_access_key(conf.secret_access_key.clone());

        if let Some(endpoint) = &conf.endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(allow_http);
        }

        builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))
    }

    fn bucket(&self) -> &str {
        &self.storage.s3.bucket_name
    }
}

#[async_trait]
impl StorageManager for S3StorageManager {
    fn storage_id(&self) -> Uuid {
        self.storage.id
    }

    async fn save(
        &self,
        media_type: MediaType,
        owner_id: Uuid,
        filename: &str,
        content: Bytes,
        _content_type: &str,
    ) -> StorageResult<String> {
        let key = keys::generate_object_key(
            media_type,
            owner_id,
            filename,
            self.storage.random_filenames,
        )?;
        let size = content.len() as u64;
        let location = Path::from(key.clone());
        let start = std::time::Instant::now();

        let client = self.client().await?;
        let result: ObjectResult<_> = client.put(&location, PutPayload::from(content)).await;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket(),
                key = %key,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 upload failed"
            );
            StorageError::UploadFailed(e.to_string())
        })?;

        tracing::info!(
            bucket = %self.bucket(),
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok(key)
    }

    async fn delete(&self, file_identifier: &str) -> StorageResult<()> {
        let location = Path::from(file_identifier.to_string());
        let start = std::time::Instant::now();

        let client = self.client().await?;
        let result: ObjectResult<_> = client.delete(&location).await;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket(),
                key = %file_identifier,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 delete failed"
            );
            StorageError::DeleteFailed(e.to_string())
        })?;

        tracing::info!(
            bucket = %self.bucket(),
            key = %file_identifier,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 delete successful"
        );

        Ok(())
    }

    async fn link(&self, file_identifier: &str, expires_in: Duration) -> StorageResult<String> {
        let location = Path::from(file_identifier.to_string());

        let client = self.client().await?;
        let url_result: ObjectResult<_> = client.signed_url(Method::GET, &location, expires_in).await;

        let url = url_result
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket(),
                    key = %file_identifier,
                    "S3 presign failed"
                );
                StorageError::LinkFailed(e.to_string())
            })?
            .to_string();

        Ok(url)
    }
}
