//! Cleanup command: delete a finished batch's processed copies and backups.

use clap::Args;

use crate::output::{self, OutputFormat};
use ziphub_core::config::AppConfig;
use ziphub_core::error::AppError;
use ziphub_core::manifest::BatchManifest;
use ziphub_jobs::CleanupAgent;

/// Arguments for the cleanup command
#[derive(Debug, Args)]
pub struct CleanupArgs {
    /// Batch manifest as a JSON array of archive keys; read from stdin
    /// when omitted
    pub manifest: Option<String>,
}

/// Execute the cleanup command
pub async fn execute(
    args: &CleanupArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let json = match &args.manifest {
        Some(inline) => inline.clone(),
        None => std::io::read_to_string(std::io::stdin())
            .map_err(|e| AppError::validation(format!("Failed to read manifest from stdin: {e}")))?,
    };
    let manifest = BatchManifest::from_json(json.trim())
        .map_err(|e| AppError::validation(format!("Invalid manifest JSON: {e}")))?;

    let store = super::create_store(config).await?;
    let agent = CleanupAgent::new(store, &config.pipeline);
    let report = agent.run(&manifest).await?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string(&report)?);
        }
        OutputFormat::Table => {
            output::print_success(&format!(
                "Cleanup completed for {} archives",
                report.archives
            ));
            output::print_kv("Requested", &report.requested.to_string());
            output::print_kv("Deleted", &report.deleted.to_string());
            output::print_kv("Failed", &report.failed.to_string());
        }
    }

    Ok(())
}
