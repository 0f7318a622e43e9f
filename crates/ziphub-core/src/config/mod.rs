//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod logging;
pub mod pipeline;
pub mod storage;

use serde::{Deserialize, Serialize};

use self::logging::LoggingConfig;
use self::pipeline::PipelineConfig;
use self::storage::StorageConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration file and environment overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Object-storage settings.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Pipeline settings shared by the three jobs.
    #[serde(default)]
    pub pipeline: PipelineConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    ///
    /// Merges the named file (optional) with environment variables
    /// prefixed with `ZIPHUB__`, e.g. `ZIPHUB__STORAGE__S3__BUCKET`.
    pub fn load(path: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("ZIPHUB")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_a_file() {
        let config = AppConfig::load("does/not/exist").unwrap();
        assert_eq!(config.pipeline.processed_prefix, "processed/");
        assert_eq!(config.pipeline.unzipped_prefix, "unzipped/");
        assert_eq!(config.pipeline.upload_concurrency, 10);
        assert_eq!(config.pipeline.delete_batch_size, 1000);
        assert_eq!(config.logging.level, "info");
    }
}
