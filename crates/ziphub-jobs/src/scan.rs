//! Bucket scan job: find archives eligible for processing.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info};

use ziphub_core::config::pipeline::PipelineConfig;
use ziphub_core::keyspace::{self, Keyspace};
use ziphub_core::manifest::BatchManifest;
use ziphub_core::result::AppResult;
use ziphub_core::traits::store::ObjectStore;

/// Read-only job that produces the batch manifest for one run.
///
/// An archive is eligible when it lives outside the reserved regions,
/// ends in `.zip` (case-insensitive), and has no same-named retired copy
/// under the processed region.
#[derive(Debug)]
pub struct Scanner {
    store: Arc<dyn ObjectStore>,
    keyspace: Keyspace,
}

impl Scanner {
    /// Create a scanner over the given store.
    pub fn new(store: Arc<dyn ObjectStore>, config: &PipelineConfig) -> Self {
        Self {
            store,
            keyspace: Keyspace::new(&config.processed_prefix, &config.unzipped_prefix),
        }
    }

    /// Scan the bucket and return the manifest in listing order.
    ///
    /// Listing errors propagate and abort the run; retrying is left to the
    /// outer orchestration layer.
    pub async fn run(&self) -> AppResult<BatchManifest> {
        info!("Scanning bucket for ZIP archives");

        let processed: HashSet<String> = self
            .store
            .list(self.keyspace.processed_prefix())
            .await?
            .into_iter()
            .filter_map(|meta| {
                meta.key
                    .strip_prefix(self.keyspace.processed_prefix())
                    .map(str::to_string)
            })
            .collect();
        debug!(count = processed.len(), "Loaded processed archive names");

        let mut archives = Vec::new();
        for meta in self.store.list("").await? {
            let key = meta.key;
            if self.keyspace.is_reserved(&key) {
                continue;
            }
            if !keyspace::is_archive(&key) {
                continue;
            }
            if processed.contains(keyspace::basename(&key)) {
                info!(archive = %key, "Skipping already processed archive");
                continue;
            }
            archives.push(key);
        }

        info!(count = archives.len(), "Found ZIP archives to process");
        Ok(BatchManifest::new(archives))
    }
}
