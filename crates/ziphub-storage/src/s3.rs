//! S3-compatible object store.
//!
//! Works against AWS S3 and S3-compatible services (Cloudflare R2, MinIO)
//! via an optional custom endpoint. Transient network errors are retried
//! by the SDK's standard retry mode (3 attempts); everything above that
//! is left to the outer orchestration layer.

use async_trait::async_trait;
use aws_config::retry::RetryConfig;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::Client;
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{Delete, ObjectIdentifier};
use bytes::Bytes;

use ziphub_core::config::storage::S3Config;
use ziphub_core::error::{AppError, ErrorKind};
use ziphub_core::result::AppResult;
use ziphub_core::traits::store::{DeleteFailure, DeleteOutcome, ObjectMeta, ObjectStore};

/// Object store backed by an S3-compatible bucket.
#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
}

impl S3ObjectStore {
    /// Create a client for the configured bucket.
    pub async fn new(config: &S3Config) -> AppResult<Self> {
        if config.bucket.is_empty() {
            return Err(AppError::configuration("storage.s3.bucket is required"));
        }

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .retry_config(RetryConfig::standard().with_max_attempts(3));

        if !config.access_key.is_empty() {
            loader = loader.credentials_provider(Credentials::new(
                config.access_key.clone(),
                config.secret_key.clone(),
                None,
                None,
                "ziphub-config",
            ));
        }
        if !config.endpoint.is_empty() {
            loader = loader.endpoint_url(&config.endpoint);
        }

        let sdk_config = loader.load().await;
        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(config.force_path_style)
            .build();

        tracing::info!(
            bucket = %config.bucket,
            region = %config.region,
            endpoint = %config.endpoint,
            "Initialized S3 object store"
        );

        Ok(Self {
            client: Client::from_conf(s3_config),
            bucket: config.bucket.clone(),
        })
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn list(&self, prefix: &str) -> AppResult<Vec<ObjectMeta>> {
        let mut objects = Vec::new();
        let mut continuation_token = None;

        loop {
            let mut req = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(prefix);
            if let Some(token) = continuation_token {
                req = req.continuation_token(token);
            }

            let resp = req.send().await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to list objects under '{prefix}'"),
                    e,
                )
            })?;

            for obj in resp.contents.unwrap_or_default() {
                let Some(key) = obj.key else { continue };
                objects.push(ObjectMeta {
                    key,
                    size_bytes: obj.size.unwrap_or(0).max(0) as u64,
                    last_modified: obj
                        .last_modified
                        .and_then(|t| chrono::DateTime::from_timestamp(t.secs(), t.subsec_nanos())),
                });
            }

            continuation_token = resp.next_continuation_token;
            if continuation_token.is_none() {
                break;
            }
        }

        Ok(objects)
    }

    async fn download(&self, key: &str) -> AppResult<Bytes> {
        let resp = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to download object '{key}'"),
                    e,
                )
            })?;

        let data = resp.body.collect().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to read body of object '{key}'"),
                e,
            )
        })?;

        Ok(data.into_bytes())
    }

    async fn upload(&self, key: &str, body: Bytes, content_type: &str) -> AppResult<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to upload object '{key}'"),
                    e,
                )
            })?;

        tracing::debug!(key, content_type, "Uploaded object");
        Ok(())
    }

    async fn copy(&self, from: &str, to: &str) -> AppResult<()> {
        self.client
            .copy_object()
            .copy_source(format!("{}/{}", self.bucket, from))
            .bucket(&self.bucket)
            .key(to)
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to copy '{from}' -> '{to}'"),
                    e,
                )
            })?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to delete object '{key}'"),
                    e,
                )
            })?;
        Ok(())
    }

    async fn delete_batch(&self, keys: &[String]) -> AppResult<DeleteOutcome> {
        if keys.is_empty() {
            return Ok(DeleteOutcome::default());
        }

        let mut identifiers = Vec::with_capacity(keys.len());
        for key in keys {
            let id = ObjectIdentifier::builder().key(key).build().map_err(|e| {
                AppError::with_source(
                    ErrorKind::Internal,
                    format!("Invalid delete key '{key}'"),
                    e,
                )
            })?;
            identifiers.push(id);
        }

        let delete = Delete::builder()
            .set_objects(Some(identifiers))
            .build()
            .map_err(|e| {
                AppError::with_source(ErrorKind::Internal, "Failed to build delete request", e)
            })?;

        let resp = self
            .client
            .delete_objects()
            .bucket(&self.bucket)
            .delete(delete)
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to delete batch of {} objects", keys.len()),
                    e,
                )
            })?;

        let failures: Vec<DeleteFailure> = resp
            .errors
            .unwrap_or_default()
            .into_iter()
            .map(|e| DeleteFailure {
                key: e.key.unwrap_or_default(),
                message: e.message.unwrap_or_else(|| "unknown error".to_string()),
            })
            .collect();

        Ok(DeleteOutcome {
            deleted: keys.len().saturating_sub(failures.len()),
            failures,
        })
    }
}
