//! S3-compatible blob store (AWS S3 or MinIO).

use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream as S3ByteStream;
use bytes::Bytes;
use tokio_util::io::ReaderStream;
use tracing::{debug, info};

use drivebox_core::config::S3Config;
use drivebox_core::error::{AppError, ErrorKind};
use drivebox_core::result::AppResult;
use drivebox_core::traits::blob::{BlobStore, ByteStream};

/// Blob store backed by an S3-compatible object store.
///
/// When an endpoint is configured (MinIO and friends), path-style
/// addressing is forced; with static credentials absent, the ambient AWS
/// credential chain is used.
#[derive(Debug, Clone)]
pub struct S3BlobStore {
    client: Client,
    bucket: String,
}

impl S3BlobStore {
    /// Create a new S3 blob store from configuration.
    pub async fn new(config: &S3Config) -> AppResult<Self> {
        if config.bucket.is_empty() {
            return Err(AppError::configuration("S3 bucket name is not configured"));
        }

        info!(
            endpoint = %config.endpoint,
            region = %config.region,
            bucket = %config.bucket,
            "Initializing S3 blob store"
        );

        let mut builder = if config.access_key.is_empty() {
            let shared = aws_config::defaults(BehaviorVersion::latest()).load().await;
            aws_sdk_s3::config::Builder::from(&shared)
        } else {
            aws_sdk_s3::config::Builder::new()
                .behavior_version(BehaviorVersion::latest())
                .credentials_provider(Credentials::new(
                    config.access_key.clone(),
                    config.secret_key.clone(),
                    None,
                    None,
                    "drivebox-config",
                ))
        };

        builder = builder.region(Region::new(config.region.clone()));
        if !config.endpoint.is_empty() {
            builder = builder
                .endpoint_url(config.endpoint.clone())
                .force_path_style(true);
        }

        Ok(Self {
            client: Client::from_conf(builder.build()),
            bucket: config.bucket.clone(),
        })
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    fn provider_type(&self) -> &str {
        "s3"
    }

    async fn put(&self, key: &str, data: Bytes, mime_type: Option<&str>) -> AppResult<()> {
        let size = data.len();
        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(S3ByteStream::from(data));

        if let Some(mime) = mime_type {
            request = request.content_type(mime);
        }

        request.send().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::BlobWriteFailed,
                format!("Failed to store object '{key}'"),
                e,
            )
        })?;

        debug!(key, bytes = size, "Stored object");
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        // S3 DeleteObject is idempotent; deleting an absent key succeeds.
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::BlobWriteFailed,
                    format!("Failed to delete object '{key}'"),
                    e,
                )
            })?;

        debug!(key, "Deleted object");
        Ok(())
    }

    async fn get_stream(&self, key: &str) -> AppResult<ByteStream> {
        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                let service_err = e.into_service_error();
                if service_err.is_no_such_key() {
                    AppError::not_found(format!("Object '{key}' not found"))
                } else {
                    AppError::with_source(
                        ErrorKind::BlobReadFailed,
                        format!("Failed to read object '{key}'"),
                        service_err,
                    )
                }
            })?;

        let reader = response.body.into_async_read();
        Ok(Box::pin(ReaderStream::new(reader)))
    }

    async fn signed_url(&self, key: &str, ttl: Duration) -> AppResult<String> {
        let presigning = PresigningConfig::expires_in(ttl).map_err(|e| {
            AppError::with_source(
                ErrorKind::Configuration,
                format!("Invalid signed URL TTL: {ttl:?}"),
                e,
            )
        })?;

        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presigning)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::BlobReadFailed,
                    format!("Failed to sign URL for object '{key}'"),
                    e,
                )
            })?;

        Ok(presigned.uri().to_string())
    }
}
