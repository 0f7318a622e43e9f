//! Pipeline configuration shared by the scan, process, and cleanup jobs.

use serde::{Deserialize, Serialize};

/// Pipeline configuration.
///
/// The prefixes define the bucket's key-space regions and double as the
/// contract between jobs; the defaults are the wire format and changing
/// them orphans any data already written under the old prefixes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Prefix of the processed region.
    #[serde(default = "default_processed_prefix")]
    pub processed_prefix: String,
    /// Prefix of the backup region.
    #[serde(default = "default_unzipped_prefix")]
    pub unzipped_prefix: String,
    /// Number of concurrent member uploads per pool.
    #[serde(default = "default_upload_concurrency")]
    pub upload_concurrency: usize,
    /// Maximum keys per batch-delete request.
    #[serde(default = "default_delete_batch_size")]
    pub delete_batch_size: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            processed_prefix: default_processed_prefix(),
            unzipped_prefix: default_unzipped_prefix(),
            upload_concurrency: default_upload_concurrency(),
            delete_batch_size: default_delete_batch_size(),
        }
    }
}

fn default_processed_prefix() -> String {
    crate::keyspace::PROCESSED_PREFIX.to_string()
}

fn default_unzipped_prefix() -> String {
    crate::keyspace::UNZIPPED_PREFIX.to_string()
}

fn default_upload_concurrency() -> usize {
    10
}

fn default_delete_batch_size() -> usize {
    1000
}
