//! Archive processing job: extract one archive and publish its contents.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use futures::StreamExt;
use tracing::{info, warn};
use walkdir::WalkDir;

use ziphub_core::config::pipeline::PipelineConfig;
use ziphub_core::error::{AppError, ErrorKind};
use ziphub_core::keyspace::{self, Keyspace};
use ziphub_core::result::AppResult;
use ziphub_core::traits::store::ObjectStore;
use ziphub_storage::mime::content_type_for;

/// Outcome of one archive-processing run.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ProcessReport {
    /// The archive that was processed.
    pub archive_key: String,
    /// Number of files the archive extracted to.
    pub members: usize,
    /// Members successfully published to the live namespace.
    pub live_published: usize,
    /// Members successfully published to the backup namespace.
    pub backup_published: usize,
    /// Whether the source archive was moved under the processed region.
    pub retired: bool,
}

/// One extracted file, with its path relative to the extraction root.
#[derive(Debug, Clone)]
struct Member {
    path: PathBuf,
    relative: String,
}

/// Job that moves one archive's contents into the live and backup
/// namespaces and retires the archive.
///
/// The archive is downloaded into a scoped temporary directory that is
/// removed on every exit path. Nothing in the bucket is mutated until at
/// least one extracted member has been published, so a failed run leaves
/// the archive eligible for the next scan.
#[derive(Debug)]
pub struct ArchiveProcessor {
    store: Arc<dyn ObjectStore>,
    keyspace: Keyspace,
    upload_concurrency: usize,
}

impl ArchiveProcessor {
    /// Create a processor over the given store.
    pub fn new(store: Arc<dyn ObjectStore>, config: &PipelineConfig) -> Self {
        Self {
            store,
            keyspace: Keyspace::new(&config.processed_prefix, &config.unzipped_prefix),
            upload_concurrency: config.upload_concurrency.max(1),
        }
    }

    /// Process a single archive key.
    pub async fn run(&self, archive_key: &str) -> AppResult<ProcessReport> {
        info!(archive = %archive_key, "Processing ZIP archive");

        let temp = tempfile::tempdir()?;

        let body = self.store.download(archive_key).await?;
        let archive_path = temp.path().join(keyspace::basename(archive_key));
        tokio::fs::write(&archive_path, &body).await?;

        let extract_root = temp.path().join("extracted");
        tokio::fs::create_dir_all(&extract_root).await?;

        let members = {
            let archive_path = archive_path.clone();
            let extract_root = extract_root.clone();
            tokio::task::spawn_blocking(move || extract_archive(&archive_path, &extract_root))
                .await
                .map_err(|e| AppError::internal(format!("Extraction task failed: {e}")))??
        };

        if members.is_empty() {
            warn!(archive = %archive_key, "Archive is empty; nothing to publish");
            return Ok(ProcessReport {
                archive_key: archive_key.to_string(),
                members: 0,
                live_published: 0,
                backup_published: 0,
                retired: false,
            });
        }
        info!(files = members.len(), "Found files to upload");

        let live_published = self
            .publish(&members, "live", |m| keyspace::live_key(archive_key, &m.relative))
            .await;
        if live_published == 0 {
            return Err(AppError::no_uploads_succeeded(format!(
                "No extracted files from '{archive_key}' could be published; leaving archive in place"
            )));
        }
        if live_published < members.len() {
            // Known gap: the archive is still retired below even though the
            // live namespace is incomplete. See DESIGN.md.
            warn!(
                archive = %archive_key,
                published = live_published,
                total = members.len(),
                "Partial publish; continuing"
            );
        }
        info!(
            published = live_published,
            total = members.len(),
            "Uploaded extracted files to their original location"
        );

        let backup_published = self
            .publish(&members, "backup", |m| {
                self.keyspace.backup_key(archive_key, &m.relative)
            })
            .await;
        info!(
            published = backup_published,
            total = members.len(),
            "Backed up extracted files"
        );

        let processed_key = self.keyspace.processed_key(archive_key);
        info!(to = %processed_key, "Retiring original archive");
        self.store.copy(archive_key, &processed_key).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::RetireFailed,
                format!("Failed to copy '{archive_key}' to '{processed_key}'"),
                e,
            )
        })?;
        self.store.delete(archive_key).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::RetireFailed,
                format!("Failed to delete original archive '{archive_key}'"),
                e,
            )
        })?;

        info!(archive = %archive_key, "Successfully processed archive");
        Ok(ProcessReport {
            archive_key: archive_key.to_string(),
            members: members.len(),
            live_published,
            backup_published,
            retired: true,
        })
    }

    /// Upload every member through a bounded pool and count successes.
    ///
    /// Individual failures are logged and folded into the count; the
    /// caller decides whether the shortfall is fatal.
    async fn publish<F>(&self, members: &[Member], pool: &str, dest: F) -> usize
    where
        F: Fn(&Member) -> String,
    {
        let uploads = members.iter().map(|member| {
            let key = dest(member);
            async move {
                match self.upload_member(member, &key).await {
                    Ok(()) => true,
                    Err(e) => {
                        warn!(file = %member.relative, key = %key, pool, error = %e, "Upload failed");
                        false
                    }
                }
            }
        });

        futures::stream::iter(uploads)
            .buffer_unordered(self.upload_concurrency)
            .fold(0usize, |acc, ok| async move { acc + usize::from(ok) })
            .await
    }

    async fn upload_member(&self, member: &Member, key: &str) -> AppResult<()> {
        let body = tokio::fs::read(&member.path).await?;
        let content_type = content_type_for(&member.path);
        self.store.upload(key, Bytes::from(body), content_type).await
    }
}

/// Open, validate, and extract an archive, returning the extracted files.
///
/// Runs on the blocking pool: the zip reader and the directory walk are
/// synchronous.
fn extract_archive(archive_path: &Path, extract_root: &Path) -> AppResult<Vec<Member>> {
    let file = std::fs::File::open(archive_path)?;
    let mut archive = zip::ZipArchive::new(std::io::BufReader::new(file)).map_err(|e| {
        let msg = format!("Not a valid ZIP archive: {e}");
        AppError::with_source(ErrorKind::InvalidArchive, msg, e)
    })?;

    info!(entries = archive.len(), "Extracting archive");
    archive.extract(extract_root).map_err(|e| match e {
        zip::result::ZipError::Io(io) => AppError::from(io),
        other => {
            let msg = format!("Failed to extract archive: {other}");
            AppError::with_source(ErrorKind::InvalidArchive, msg, other)
        }
    })?;

    let mut members = Vec::new();
    for entry in WalkDir::new(extract_root) {
        let entry = entry.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, "Failed to walk extraction root", e)
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(extract_root)
            .map_err(|e| {
                AppError::with_source(ErrorKind::Internal, "Extracted file escaped root", e)
            })?
            .to_string_lossy()
            .into_owned();
        members.push(Member {
            path: entry.path().to_path_buf(),
            relative,
        });
    }

    Ok(members)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use ziphub_core::error::ErrorKind;
    use ziphub_storage::MemoryObjectStore;

    fn zip_bytes(entries: &[(&str, &str)]) -> Bytes {
        let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
        let options = zip::write::SimpleFileOptions::default();
        for (name, contents) in entries {
            writer.start_file(*name, options).unwrap();
            writer.write_all(contents.as_bytes()).unwrap();
        }
        Bytes::from(writer.finish().unwrap().into_inner())
    }

    fn processor(store: Arc<MemoryObjectStore>) -> ArchiveProcessor {
        ArchiveProcessor::new(store, &PipelineConfig::default())
    }

    #[tokio::test]
    async fn publishes_members_and_retires_the_archive() {
        let store = Arc::new(MemoryObjectStore::new());
        store
            .put(
                "drop/a.zip",
                zip_bytes(&[("x.txt", "one"), ("sub/y.txt", "two")]),
                "application/zip",
            )
            .await;

        let report = processor(Arc::clone(&store)).run("drop/a.zip").await.unwrap();

        assert_eq!(report.members, 2);
        assert_eq!(report.live_published, 2);
        assert_eq!(report.backup_published, 2);
        assert!(report.retired);

        // Live members land next to the archive.
        assert_eq!(store.get("drop/x.txt").await.unwrap(), "one");
        assert_eq!(store.get("drop/sub/y.txt").await.unwrap(), "two");
        assert_eq!(
            store.content_type_of("drop/x.txt").await.as_deref(),
            Some("text/plain")
        );

        // Backups land under the archive's stem.
        assert!(store.contains("unzipped/a/x.txt").await);
        assert!(store.contains("unzipped/a/sub/y.txt").await);

        // The archive moved to the processed region.
        assert!(store.contains("processed/a.zip").await);
        assert!(!store.contains("drop/a.zip").await);
    }

    #[tokio::test]
    async fn empty_archive_is_a_noop_success() {
        let store = Arc::new(MemoryObjectStore::new());
        store
            .put("empty.zip", zip_bytes(&[]), "application/zip")
            .await;

        let report = processor(Arc::clone(&store)).run("empty.zip").await.unwrap();

        assert_eq!(report.members, 0);
        assert!(!report.retired);
        // No mutation: the archive stays live and alone.
        assert_eq!(store.keys().await, vec!["empty.zip"]);
    }

    #[tokio::test]
    async fn invalid_archive_fails_without_mutation() {
        let store = Arc::new(MemoryObjectStore::new());
        store
            .put("bad.zip", Bytes::from_static(b"not a zip"), "application/zip")
            .await;

        let err = processor(Arc::clone(&store)).run("bad.zip").await.unwrap_err();

        assert_eq!(err.kind, ErrorKind::InvalidArchive);
        assert_eq!(store.keys().await, vec!["bad.zip"]);
    }

    #[tokio::test]
    async fn missing_archive_fails_the_download_step() {
        let store = Arc::new(MemoryObjectStore::new());
        let err = processor(store).run("ghost.zip").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn zero_successful_uploads_leave_the_archive_in_place() {
        let store = Arc::new(MemoryObjectStore::new().fail_uploads_under(""));
        store
            .put("a.zip", zip_bytes(&[("x.txt", "one")]), "application/zip")
            .await;

        let err = processor(Arc::clone(&store)).run("a.zip").await.unwrap_err();

        assert_eq!(err.kind, ErrorKind::NoUploadsSucceeded);
        assert!(store.contains("a.zip").await);
        assert!(!store.contains("processed/a.zip").await);
    }

    #[tokio::test]
    async fn partial_publish_still_retires() {
        // Uploads into sub/ fail; the root-level member goes through.
        let store = Arc::new(MemoryObjectStore::new().fail_uploads_under("sub/"));
        store
            .put(
                "a.zip",
                zip_bytes(&[("x.txt", "one"), ("sub/y.txt", "two")]),
                "application/zip",
            )
            .await;

        let report = processor(Arc::clone(&store)).run("a.zip").await.unwrap();

        assert_eq!(report.members, 2);
        assert_eq!(report.live_published, 1);
        assert_eq!(report.backup_published, 2);
        assert!(report.retired);
        assert!(store.contains("x.txt").await);
        assert!(!store.contains("sub/y.txt").await);
        assert!(store.contains("processed/a.zip").await);
        assert!(!store.contains("a.zip").await);
    }

    #[tokio::test]
    async fn retire_copy_failure_keeps_the_archive_live() {
        let store = Arc::new(MemoryObjectStore::new().fail_copies());
        store
            .put("a.zip", zip_bytes(&[("x.txt", "one")]), "application/zip")
            .await;

        let err = processor(Arc::clone(&store)).run("a.zip").await.unwrap_err();

        assert_eq!(err.kind, ErrorKind::RetireFailed);
        assert!(store.contains("a.zip").await);
        assert!(!store.contains("processed/a.zip").await);
        // Published members survive; the next run overwrites them.
        assert!(store.contains("x.txt").await);
    }
}
