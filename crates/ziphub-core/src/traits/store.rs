//! Object-store trait for pluggable bucket backends.

use async_trait::async_trait;
use bytes::Bytes;

use crate::result::AppResult;

/// Metadata about a stored object.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ObjectMeta {
    /// Key within the bucket.
    pub key: String,
    /// Size in bytes.
    pub size_bytes: u64,
    /// Last modified timestamp.
    pub last_modified: Option<chrono::DateTime<chrono::Utc>>,
}

/// One key a batch delete could not remove.
#[derive(Debug, Clone)]
pub struct DeleteFailure {
    /// The key that survived.
    pub key: String,
    /// The backend's error message.
    pub message: String,
}

/// Result of a batch delete: per-key failures do not fail the call.
#[derive(Debug, Clone, Default)]
pub struct DeleteOutcome {
    /// Number of keys removed.
    pub deleted: usize,
    /// Keys the backend reported errors for.
    pub failures: Vec<DeleteFailure>,
}

/// Trait for bucket backends.
///
/// The [`ObjectStore`] trait is defined here in `ziphub-core` and
/// implemented in `ziphub-storage` (S3-compatible services, plus an
/// in-memory store for tests). The jobs receive a store handle by
/// injection; nothing reaches for a global client.
#[async_trait]
pub trait ObjectStore: Send + Sync + std::fmt::Debug + 'static {
    /// List every object under a prefix, in listing order.
    ///
    /// Implementations page through the backend internally and return the
    /// concatenated result. An empty prefix lists the whole bucket.
    async fn list(&self, prefix: &str) -> AppResult<Vec<ObjectMeta>>;

    /// Read a whole object into memory.
    async fn download(&self, key: &str) -> AppResult<Bytes>;

    /// Write a whole object with content-type metadata.
    async fn upload(&self, key: &str, body: Bytes, content_type: &str) -> AppResult<()>;

    /// Server-side copy within the bucket.
    async fn copy(&self, from: &str, to: &str) -> AppResult<()>;

    /// Delete a single object. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// Delete a batch of objects in one backend call.
    ///
    /// Callers are responsible for keeping `keys` within the backend's
    /// per-request item limit. Per-key failures are reported in the
    /// outcome rather than failing the call.
    async fn delete_batch(&self, keys: &[String]) -> AppResult<DeleteOutcome>;
}
