//! CLI command definitions and dispatch.

pub mod cleanup;
pub mod process;
pub mod scan;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use ziphub_core::config::AppConfig;
use ziphub_core::error::AppError;
use ziphub_core::traits::store::ObjectStore;
use ziphub_storage::S3ObjectStore;

/// ZipHub — archive-ingestion pipeline for object-storage buckets
#[derive(Debug, Parser)]
#[command(name = "ziphub", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Scan the bucket and emit the batch manifest of unprocessed archives
    Scan,
    /// Extract one archive, publish its contents, and retire it
    Process(process::ProcessArgs),
    /// Delete processed archives and their backups for a finished batch
    Cleanup(cleanup::CleanupArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: &AppConfig) -> Result<(), AppError> {
        match &self.command {
            Commands::Scan => scan::execute(config, self.format).await,
            Commands::Process(args) => process::execute(args, config, self.format).await,
            Commands::Cleanup(args) => cleanup::execute(args, config, self.format).await,
        }
    }
}

/// Helper: create the object store from config
pub async fn create_store(config: &AppConfig) -> Result<Arc<dyn ObjectStore>, AppError> {
    let store = S3ObjectStore::new(&config.storage.s3).await?;
    Ok(Arc::new(store))
}
