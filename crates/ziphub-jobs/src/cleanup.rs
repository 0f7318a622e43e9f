//! Cleanup job: delete processed archives and their backups.

use std::sync::Arc;

use tracing::{debug, info, warn};

use ziphub_core::config::pipeline::PipelineConfig;
use ziphub_core::keyspace::Keyspace;
use ziphub_core::manifest::BatchManifest;
use ziphub_core::result::AppResult;
use ziphub_core::traits::store::ObjectStore;

/// Outcome of one cleanup run.
#[derive(Debug, Clone, serde::Serialize)]
pub struct CleanupReport {
    /// Number of archives in the manifest.
    pub archives: usize,
    /// Keys queued for deletion.
    pub requested: usize,
    /// Keys actually removed.
    pub deleted: usize,
    /// Keys that could not be removed.
    pub failed: usize,
}

/// Job that retires a confirmed batch for good: the processed-archive
/// copies and every backup member are deleted, in batches.
///
/// Deletion is best-effort. A stray undeleted backup is cleanup debt, not
/// a correctness problem, so per-key and per-batch failures are recorded
/// and the remaining batches still run.
#[derive(Debug)]
pub struct CleanupAgent {
    store: Arc<dyn ObjectStore>,
    keyspace: Keyspace,
    delete_batch_size: usize,
}

impl CleanupAgent {
    /// Create a cleanup agent over the given store.
    pub fn new(store: Arc<dyn ObjectStore>, config: &PipelineConfig) -> Self {
        Self {
            store,
            keyspace: Keyspace::new(&config.processed_prefix, &config.unzipped_prefix),
            delete_batch_size: config.delete_batch_size.max(1),
        }
    }

    /// Delete the processed copies and backups for every archive in the
    /// manifest.
    ///
    /// Listing errors while enumerating backups propagate; delete
    /// failures are only recorded in the report.
    pub async fn run(&self, manifest: &BatchManifest) -> AppResult<CleanupReport> {
        info!(archives = manifest.len(), "Running cleanup for processed archives");

        let mut to_delete: Vec<String> = Vec::new();
        for archive_key in manifest.iter() {
            let processed_key = self.keyspace.processed_key(archive_key);
            debug!(key = %processed_key, "Queueing processed archive for deletion");
            to_delete.push(processed_key);

            let backup_prefix = self.keyspace.backup_prefix(archive_key);
            let backups = self.store.list(&backup_prefix).await?;
            info!(
                archive = %archive_key,
                backups = backups.len(),
                "Queueing backup files for deletion"
            );
            to_delete.extend(backups.into_iter().map(|meta| meta.key));
        }

        let requested = to_delete.len();
        let mut deleted = 0;
        let mut failed = 0;

        for batch in to_delete.chunks(self.delete_batch_size) {
            match self.store.delete_batch(batch).await {
                Ok(outcome) => {
                    for failure in &outcome.failures {
                        warn!(key = %failure.key, error = %failure.message, "Failed to delete object");
                    }
                    deleted += outcome.deleted;
                    failed += outcome.failures.len();
                    info!(batch = batch.len(), deleted = outcome.deleted, "Deleted batch of objects");
                }
                Err(e) => {
                    warn!(batch = batch.len(), error = %e, "Batch delete failed");
                    failed += batch.len();
                }
            }
        }

        info!(deleted, failed, "Cleanup completed");
        Ok(CleanupReport {
            archives: manifest.len(),
            requested,
            deleted,
            failed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ziphub_storage::MemoryObjectStore;

    async fn seeded_store() -> MemoryObjectStore {
        let store = MemoryObjectStore::new();
        store.put("processed/a.zip", "zip", "application/zip").await;
        store.put("unzipped/a/x.txt", "x", "text/plain").await;
        store.put("unzipped/a/sub/y.txt", "y", "text/plain").await;
        // Unrelated keys that must survive.
        store.put("x.txt", "x", "text/plain").await;
        store.put("processed/other.zip", "zip", "application/zip").await;
        store.put("unzipped/other/z.txt", "z", "text/plain").await;
        store
    }

    fn manifest(keys: &[&str]) -> BatchManifest {
        keys.iter().map(|k| k.to_string()).collect()
    }

    #[tokio::test]
    async fn deletes_processed_copy_and_backups() {
        let store = Arc::new(seeded_store().await);
        let agent = CleanupAgent::new(Arc::clone(&store), &PipelineConfig::default());

        let report = agent.run(&manifest(&["drop/a.zip"])).await.unwrap();

        assert_eq!(report.archives, 1);
        assert_eq!(report.requested, 3);
        assert_eq!(report.deleted, 3);
        assert_eq!(report.failed, 0);

        assert!(!store.contains("processed/a.zip").await);
        assert!(!store.contains("unzipped/a/x.txt").await);
        assert!(!store.contains("unzipped/a/sub/y.txt").await);

        assert!(store.contains("x.txt").await);
        assert!(store.contains("processed/other.zip").await);
        assert!(store.contains("unzipped/other/z.txt").await);
    }

    #[tokio::test]
    async fn second_run_deletes_nothing() {
        let store = Arc::new(seeded_store().await);
        let agent = CleanupAgent::new(Arc::clone(&store), &PipelineConfig::default());
        let batch = manifest(&["a.zip"]);

        agent.run(&batch).await.unwrap();
        let keys_after_first = store.keys().await;

        let report = agent.run(&batch).await.unwrap();
        assert_eq!(report.deleted, 0);
        assert_eq!(report.failed, 0);
        assert_eq!(store.keys().await, keys_after_first);
    }

    #[tokio::test]
    async fn small_batches_still_cover_everything() {
        let store = Arc::new(seeded_store().await);
        let config = PipelineConfig {
            delete_batch_size: 2,
            ..PipelineConfig::default()
        };
        let agent = CleanupAgent::new(Arc::clone(&store), &config);

        let report = agent.run(&manifest(&["a.zip", "other.zip"])).await.unwrap();

        assert_eq!(report.requested, 5);
        assert_eq!(report.deleted, 5);
        assert!(!store.contains("processed/other.zip").await);
        assert!(!store.contains("unzipped/other/z.txt").await);
    }

    #[tokio::test]
    async fn delete_failures_are_recorded_not_fatal() {
        let store = Arc::new(
            MemoryObjectStore::new().fail_deletes_under("unzipped/"),
        );
        store.put("processed/a.zip", "zip", "application/zip").await;
        store.put("unzipped/a/x.txt", "x", "text/plain").await;

        let agent = CleanupAgent::new(Arc::clone(&store), &PipelineConfig::default());
        let report = agent.run(&manifest(&["a.zip"])).await.unwrap();

        assert_eq!(report.deleted, 1);
        assert_eq!(report.failed, 1);
        assert!(!store.contains("processed/a.zip").await);
        assert!(store.contains("unzipped/a/x.txt").await);
    }
}
