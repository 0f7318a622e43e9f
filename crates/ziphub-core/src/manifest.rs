//! The batch manifest: the list of archive keys selected by one scan run.
//!
//! The manifest is the only state shared between jobs. It serializes as a
//! plain JSON array of keys so an orchestration layer can fan out one
//! process invocation per entry and hand the whole batch to cleanup.

use serde::{Deserialize, Serialize};

use crate::result::AppResult;

/// Ordered list of archive keys handled in one orchestration cycle.
///
/// Order is the bucket listing order; it is preserved but not sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BatchManifest {
    archives: Vec<String>,
}

impl BatchManifest {
    /// Create a manifest from a list of archive keys.
    pub fn new(archives: Vec<String>) -> Self {
        Self { archives }
    }

    /// Parse a manifest from its JSON-array form.
    pub fn from_json(json: &str) -> AppResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize the manifest to its JSON-array form.
    pub fn to_json(&self) -> AppResult<String> {
        Ok(serde_json::to_string(&self.archives)?)
    }

    /// Number of archives in the manifest.
    pub fn len(&self) -> usize {
        self.archives.len()
    }

    /// Whether the manifest is empty.
    pub fn is_empty(&self) -> bool {
        self.archives.is_empty()
    }

    /// The archive keys in listing order.
    pub fn archives(&self) -> &[String] {
        &self.archives
    }

    /// Iterate the archive keys in listing order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.archives.iter().map(String::as_str)
    }
}

impl FromIterator<String> for BatchManifest {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_round_trip_preserves_order() {
        let manifest =
            BatchManifest::new(vec!["b.zip".to_string(), "a/nested.zip".to_string()]);
        let json = manifest.to_json().unwrap();
        assert_eq!(json, r#"["b.zip","a/nested.zip"]"#);

        let back = BatchManifest::from_json(&json).unwrap();
        assert_eq!(back, manifest);
        assert_eq!(back.len(), 2);
    }

    #[test]
    fn rejects_non_array_input() {
        assert!(BatchManifest::from_json(r#"{"archives": []}"#).is_err());
    }

    #[test]
    fn empty_manifest() {
        let manifest = BatchManifest::from_json("[]").unwrap();
        assert!(manifest.is_empty());
    }
}
