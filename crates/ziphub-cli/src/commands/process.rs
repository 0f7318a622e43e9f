//! Process command: run the archive processor for one key.

use clap::Args;

use crate::output::{self, OutputFormat};
use ziphub_core::config::AppConfig;
use ziphub_core::error::AppError;
use ziphub_jobs::ArchiveProcessor;

/// Arguments for the process command
#[derive(Debug, Args)]
pub struct ProcessArgs {
    /// Bucket key of the archive to process
    pub archive_key: String,
}

/// Execute the process command
pub async fn execute(
    args: &ProcessArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let store = super::create_store(config).await?;
    let processor = ArchiveProcessor::new(store, &config.pipeline);
    let report = processor.run(&args.archive_key).await?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string(&report)?);
        }
        OutputFormat::Table => {
            if report.members == 0 {
                output::print_warning(&format!("Archive '{}' was empty", report.archive_key));
            } else {
                output::print_success(&format!("Processed '{}'", report.archive_key));
                output::print_kv("Members", &report.members.to_string());
                output::print_kv(
                    "Live uploads",
                    &format!("{}/{}", report.live_published, report.members),
                );
                output::print_kv(
                    "Backup uploads",
                    &format!("{}/{}", report.backup_published, report.members),
                );
            }
        }
    }

    Ok(())
}
