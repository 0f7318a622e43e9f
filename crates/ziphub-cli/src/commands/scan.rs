//! Scan command: emit the batch manifest for the orchestration layer.

use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use ziphub_core::config::AppConfig;
use ziphub_core::error::AppError;
use ziphub_jobs::Scanner;

/// Machine-readable scan result.
#[derive(Debug, Serialize)]
struct ScanOutput {
    archives: Vec<String>,
    count: usize,
}

/// Table row for one candidate archive.
#[derive(Debug, Serialize, Tabled)]
struct ArchiveRow {
    archive: String,
}

/// Execute the scan command
pub async fn execute(config: &AppConfig, format: OutputFormat) -> Result<(), AppError> {
    let store = super::create_store(config).await?;
    let scanner = Scanner::new(store, &config.pipeline);
    let manifest = scanner.run().await?;

    match format {
        OutputFormat::Json => {
            let out = ScanOutput {
                count: manifest.len(),
                archives: manifest.archives().to_vec(),
            };
            println!("{}", serde_json::to_string(&out)?);
        }
        OutputFormat::Table => {
            let rows: Vec<ArchiveRow> = manifest
                .iter()
                .map(|key| ArchiveRow {
                    archive: key.to_string(),
                })
                .collect();
            output::print_list(&rows, format);
            output::print_kv("Count", &manifest.len().to_string());
        }
    }

    Ok(())
}
