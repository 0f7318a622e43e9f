//! # ziphub-jobs
//!
//! The three batch jobs of the archive-ingestion pipeline. Each job is an
//! independent single-pass invocation over a shared bucket; the only state
//! between them is the bucket's key namespace and the batch manifest.
//!
//! - [`Scanner`] lists the bucket and emits the manifest of unprocessed
//!   ZIP archives.
//! - [`ArchiveProcessor`] downloads one archive, extracts it, publishes
//!   the members to the live and backup namespaces, and retires the
//!   archive under `processed/`.
//! - [`CleanupAgent`] deletes processed archives and their backups once a
//!   batch is confirmed.

pub mod cleanup;
pub mod process;
pub mod scan;

pub use cleanup::{CleanupAgent, CleanupReport};
pub use process::{ArchiveProcessor, ProcessReport};
pub use scan::Scanner;
