//! In-memory object store.
//!
//! A complete in-process `ObjectStore` used by job and pipeline tests in
//! place of a real bucket. Failure injection knobs force the error paths
//! (upload failures, copy failures, delete failures) that a real bucket
//! only produces under outage.

use std::collections::BTreeMap;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::RwLock;

use ziphub_core::error::AppError;
use ziphub_core::result::AppResult;
use ziphub_core::traits::store::{DeleteFailure, DeleteOutcome, ObjectMeta, ObjectStore};

#[derive(Debug, Clone)]
struct StoredObject {
    body: Bytes,
    content_type: String,
    last_modified: chrono::DateTime<chrono::Utc>,
}

/// Object store held entirely in memory. Listing order is lexicographic.
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    objects: RwLock<BTreeMap<String, StoredObject>>,
    fail_upload_prefix: Option<String>,
    fail_delete_prefix: Option<String>,
    fail_copies: bool,
}

impl MemoryObjectStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `upload` under the given prefix fail. An empty prefix
    /// fails all uploads.
    pub fn fail_uploads_under(mut self, prefix: impl Into<String>) -> Self {
        self.fail_upload_prefix = Some(prefix.into());
        self
    }

    /// Make every key in a `delete_batch` under the given prefix fail.
    pub fn fail_deletes_under(mut self, prefix: impl Into<String>) -> Self {
        self.fail_delete_prefix = Some(prefix.into());
        self
    }

    /// Make every `copy` fail.
    pub fn fail_copies(mut self) -> Self {
        self.fail_copies = true;
        self
    }

    /// Seed an object directly, bypassing failure injection.
    pub async fn put(&self, key: &str, body: impl Into<Bytes>, content_type: &str) {
        self.objects.write().await.insert(
            key.to_string(),
            StoredObject {
                body: body.into(),
                content_type: content_type.to_string(),
                last_modified: chrono::Utc::now(),
            },
        );
    }

    /// Whether a key exists.
    pub async fn contains(&self, key: &str) -> bool {
        self.objects.read().await.contains_key(key)
    }

    /// Read an object's body, if present.
    pub async fn get(&self, key: &str) -> Option<Bytes> {
        self.objects.read().await.get(key).map(|o| o.body.clone())
    }

    /// Read an object's stored content type, if present.
    pub async fn content_type_of(&self, key: &str) -> Option<String> {
        self.objects
            .read()
            .await
            .get(key)
            .map(|o| o.content_type.clone())
    }

    /// All keys in listing order.
    pub async fn keys(&self) -> Vec<String> {
        self.objects.read().await.keys().cloned().collect()
    }

    /// Total number of stored objects.
    pub async fn object_count(&self) -> usize {
        self.objects.read().await.len()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn list(&self, prefix: &str) -> AppResult<Vec<ObjectMeta>> {
        let objects = self.objects.read().await;
        Ok(objects
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, obj)| ObjectMeta {
                key: key.clone(),
                size_bytes: obj.body.len() as u64,
                last_modified: Some(obj.last_modified),
            })
            .collect())
    }

    async fn download(&self, key: &str) -> AppResult<Bytes> {
        self.get(key)
            .await
            .ok_or_else(|| AppError::not_found(format!("Object not found: {key}")))
    }

    async fn upload(&self, key: &str, body: Bytes, content_type: &str) -> AppResult<()> {
        if let Some(prefix) = &self.fail_upload_prefix {
            if key.starts_with(prefix.as_str()) {
                return Err(AppError::storage(format!(
                    "Injected upload failure for '{key}'"
                )));
            }
        }
        self.put(key, body, content_type).await;
        Ok(())
    }

    async fn copy(&self, from: &str, to: &str) -> AppResult<()> {
        if self.fail_copies {
            return Err(AppError::storage(format!(
                "Injected copy failure for '{from}' -> '{to}'"
            )));
        }
        let mut objects = self.objects.write().await;
        let source = objects
            .get(from)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("Copy source not found: {from}")))?;
        objects.insert(to.to_string(), source);
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.objects.write().await.remove(key);
        Ok(())
    }

    async fn delete_batch(&self, keys: &[String]) -> AppResult<DeleteOutcome> {
        let mut objects = self.objects.write().await;
        let mut outcome = DeleteOutcome::default();
        for key in keys {
            if let Some(prefix) = &self.fail_delete_prefix {
                if key.starts_with(prefix.as_str()) {
                    outcome.failures.push(DeleteFailure {
                        key: key.clone(),
                        message: "Injected delete failure".to_string(),
                    });
                    continue;
                }
            }
            // Removing a missing key is a no-op, as on S3.
            if objects.remove(key).is_some() {
                outcome.deleted += 1;
            }
        }
        Ok(outcome)
    }
}
