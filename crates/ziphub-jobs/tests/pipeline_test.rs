//! Integration test for the full scan -> process -> cleanup cycle.

use std::io::Write;
use std::sync::Arc;

use bytes::Bytes;

use ziphub_core::config::pipeline::PipelineConfig;
use ziphub_jobs::{ArchiveProcessor, CleanupAgent, Scanner};
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

#[tokio::test]
async fn full_cycle_over_one_batch() {
    let store = Arc::new(MemoryObjectStore::new());
    let config = PipelineConfig::default();

    store
        .put(
            "a.zip",
            zip_bytes(&[("x.txt", "one"), ("sub/y.txt", "two")]),
            "application/zip",
        )
        .await;
    store.put("processed/old.zip", "zip", "application/zip").await;

    // Scan: only the fresh archive is eligible.
    let scanner = Scanner::new(Arc::clone(&store), &config);
    let manifest = scanner.run().await.unwrap();
    assert_eq!(manifest.archives(), &["a.zip"]);

    // Process each manifest entry, as the orchestrator would.
    let processor = ArchiveProcessor::new(Arc::clone(&store), &config);
    for archive_key in manifest.iter() {
        let report = processor.run(archive_key).await.unwrap();
        assert!(report.retired);
    }

    assert!(store.contains("x.txt").await);
    assert!(store.contains("sub/y.txt").await);
    assert!(store.contains("unzipped/a/x.txt").await);
    assert!(store.contains("unzipped/a/sub/y.txt").await);
    assert!(store.contains("processed/a.zip").await);
    assert!(!store.contains("a.zip").await);

    // A second scan finds nothing: the processed copy is the idempotence
    // signal even though the published members are still live keys.
    let rescan = scanner.run().await.unwrap();
    assert!(rescan.is_empty());

    // Cleanup removes the processed copy and the backups, and only them.
    let agent = CleanupAgent::new(Arc::clone(&store), &config);
    let report = agent.run(&manifest).await.unwrap();
    assert_eq!(report.deleted, 3);
    assert_eq!(report.failed, 0);

    assert!(!store.contains("processed/a.zip").await);
    assert!(!store.contains("unzipped/a/x.txt").await);
    assert!(!store.contains("unzipped/a/sub/y.txt").await);
    assert!(store.contains("x.txt").await);
    assert!(store.contains("sub/y.txt").await);
    assert!(store.contains("processed/old.zip").await);
}
