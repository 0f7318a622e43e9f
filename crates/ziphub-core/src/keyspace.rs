//! Bucket key-space conventions.
//!
//! The bucket is a flat key-space partitioned by convention into three
//! regions: `processed/<archive-basename>` holds retired archives,
//! `unzipped/<archive-stem>/<relative-path>` holds backup copies of
//! extracted members, and everything else is live. These conventions are
//! the contract between the scan, process, and cleanup jobs and between
//! separate runs, so they must not drift.

/// Default prefix for retired archives.
pub const PROCESSED_PREFIX: &str = "processed/";

/// Default prefix for backup copies of extracted members.
pub const UNZIPPED_PREFIX: &str = "unzipped/";

/// Return the final path segment of a key.
pub fn basename(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}

/// Return the basename of a key with its final extension removed.
///
/// A leading dot is not treated as an extension separator, so a bare
/// `.zip` keeps its name.
pub fn stem(key: &str) -> &str {
    let base = basename(key);
    match base.rfind('.') {
        Some(pos) if pos > 0 => &base[..pos],
        _ => base,
    }
}

/// Return the directory part of a key, without a trailing slash.
///
/// Root-level keys have an empty directory part.
pub fn parent_dir(key: &str) -> &str {
    match key.rfind('/') {
        Some(pos) => &key[..pos],
        None => "",
    }
}

/// Whether a key names a ZIP archive, matched case-insensitively.
pub fn is_archive(key: &str) -> bool {
    let len = key.len();
    len >= 4
        && key.is_char_boundary(len - 4)
        && key[len - 4..].eq_ignore_ascii_case(".zip")
}

/// Compute the live destination for an extracted member: the member's
/// path relative to the extraction root, placed next to the archive.
pub fn live_key(archive_key: &str, relative_path: &str) -> String {
    let dir = parent_dir(archive_key);
    if dir.is_empty() {
        relative_path.to_string()
    } else {
        format!("{dir}/{relative_path}")
    }
}

/// Key-space partitioning for one bucket.
///
/// The prefixes are configurable but default to the standard convention;
/// changing them on a bucket with existing data orphans the old regions.
#[derive(Debug, Clone)]
pub struct Keyspace {
    processed_prefix: String,
    unzipped_prefix: String,
}

impl Keyspace {
    /// Create a key-space with explicit region prefixes.
    pub fn new(processed_prefix: impl Into<String>, unzipped_prefix: impl Into<String>) -> Self {
        Self {
            processed_prefix: processed_prefix.into(),
            unzipped_prefix: unzipped_prefix.into(),
        }
    }

    /// The prefix of the processed region.
    pub fn processed_prefix(&self) -> &str {
        &self.processed_prefix
    }

    /// The prefix of the backup region.
    pub fn unzipped_prefix(&self) -> &str {
        &self.unzipped_prefix
    }

    /// The retired location of an archive: `processed/<basename>`.
    pub fn processed_key(&self, archive_key: &str) -> String {
        format!("{}{}", self.processed_prefix, basename(archive_key))
    }

    /// The backup region of an archive: `unzipped/<stem>/`.
    pub fn backup_prefix(&self, archive_key: &str) -> String {
        format!("{}{}/", self.unzipped_prefix, stem(archive_key))
    }

    /// The backup destination of one extracted member.
    pub fn backup_key(&self, archive_key: &str, relative_path: &str) -> String {
        format!("{}{}", self.backup_prefix(archive_key), relative_path)
    }

    /// Whether a key falls under the processed or backup region.
    pub fn is_reserved(&self, key: &str) -> bool {
        key.starts_with(&self.processed_prefix) || key.starts_with(&self.unzipped_prefix)
    }
}

impl Default for Keyspace {
    fn default() -> Self {
        Self::new(PROCESSED_PREFIX, UNZIPPED_PREFIX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basename_handles_nesting() {
        assert_eq!(basename("a/b/c.zip"), "c.zip");
        assert_eq!(basename("c.zip"), "c.zip");
        assert_eq!(basename("a/"), "");
    }

    #[test]
    fn stem_strips_only_the_final_extension() {
        assert_eq!(stem("a/b/archive.zip"), "archive");
        assert_eq!(stem("bundle.tar.zip"), "bundle.tar");
        assert_eq!(stem("noext"), "noext");
        assert_eq!(stem(".zip"), ".zip");
    }

    #[test]
    fn parent_dir_of_root_key_is_empty() {
        assert_eq!(parent_dir("c.zip"), "");
        assert_eq!(parent_dir("a/b/c.zip"), "a/b");
    }

    #[test]
    fn archive_detection_is_case_insensitive() {
        assert!(is_archive("a.zip"));
        assert!(is_archive("A.ZIP"));
        assert!(is_archive("dir/b.Zip"));
        assert!(is_archive("héllo.zip"));
        assert!(!is_archive("a.zip.bak"));
        assert!(!is_archive("zip"));
        assert!(!is_archive("a.gz"));
        assert!(!is_archive("名前"));
    }

    #[test]
    fn live_keys_are_siblings_of_the_archive() {
        assert_eq!(live_key("a.zip", "x.txt"), "x.txt");
        assert_eq!(live_key("a.zip", "sub/y.txt"), "sub/y.txt");
        assert_eq!(live_key("drop/a.zip", "x.txt"), "drop/x.txt");
        assert_eq!(live_key("drop/a.zip", "sub/y.txt"), "drop/sub/y.txt");
    }

    #[test]
    fn default_keyspace_composition() {
        let ks = Keyspace::default();
        assert_eq!(ks.processed_key("drop/a.zip"), "processed/a.zip");
        assert_eq!(ks.backup_prefix("drop/a.zip"), "unzipped/a/");
        assert_eq!(ks.backup_key("a.zip", "sub/y.txt"), "unzipped/a/sub/y.txt");
    }

    #[test]
    fn reserved_regions_are_detected() {
        let ks = Keyspace::default();
        assert!(ks.is_reserved("processed/a.zip"));
        assert!(ks.is_reserved("unzipped/a/x.txt"));
        assert!(!ks.is_reserved("a.zip"));
        assert!(!ks.is_reserved("drop/processed/a.zip"));
    }
}
