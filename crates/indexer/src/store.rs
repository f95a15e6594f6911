use crate::error::{IndexerError, Result};
use docsync_parser::Document;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

pub const STORE_SCHEMA_VERSION: u32 = 1;

/// A corpus file that produced no document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseFailure {
    pub path: String,
    pub reason: String,
}

/// Everything derived by one full resync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    pub schema_version: u32,
    pub synced_at_unix_ms: u64,
    /// Corpus root the documents were scanned from.
    pub root: String,
    pub documents: Vec<Document>,
    #[serde(default)]
    pub failures: Vec<ParseFailure>,
}

impl Default for StoreSnapshot {
    fn default() -> Self {
        Self {
            schema_version: STORE_SCHEMA_VERSION,
            synced_at_unix_ms: 0,
            root: String::new(),
            documents: Vec::new(),
            failures: Vec::new(),
        }
    }
}

/// JSON-backed document store.
///
/// Opened once per process and passed to whoever needs documents. The only write is
/// [`DocStore::replace_all`], which swaps the whole snapshot atomically.
#[derive(Debug, Clone)]
pub struct DocStore {
    path: PathBuf,
    snapshot: StoreSnapshot,
}

impl DocStore {
    /// Open the store at `path`. A missing file is an empty store; a corrupt one is an error.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let snapshot = if path.exists() {
            let bytes = tokio::fs::read(&path).await?;
            let snapshot: StoreSnapshot = serde_json::from_slice(&bytes)?;
            if snapshot.schema_version != STORE_SCHEMA_VERSION {
                return Err(IndexerError::SchemaMismatch {
                    found: snapshot.schema_version,
                    expected: STORE_SCHEMA_VERSION,
                });
            }
            snapshot
        } else {
            log::debug!("No document store at {}, starting empty", path.display());
            StoreSnapshot::default()
        };
        Ok(Self { path, snapshot })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn snapshot(&self) -> &StoreSnapshot {
        &self.snapshot
    }

    #[must_use]
    pub fn documents(&self) -> &[Document] {
        &self.snapshot.documents
    }

    #[must_use]
    pub fn failures(&self) -> &[ParseFailure] {
        &self.snapshot.failures
    }

    /// Never synced (or synced from an empty corpus).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshot.documents.is_empty() && self.snapshot.failures.is_empty()
    }

    #[must_use]
    pub fn document(&self, id: &str) -> Option<&Document> {
        self.snapshot.documents.iter().find(|d| d.id == id)
    }

    /// Replace every stored document and failure with the result of a new scan.
    ///
    /// The snapshot is written to a temporary sibling file and renamed over the old one, so a
    /// concurrent reader sees either the previous or the new snapshot.
    pub async fn replace_all(
        &mut self,
        root: &str,
        documents: Vec<Document>,
        failures: Vec<ParseFailure>,
    ) -> Result<()> {
        let snapshot = StoreSnapshot {
            schema_version: STORE_SCHEMA_VERSION,
            synced_at_unix_ms: unix_now_ms(),
            root: root.to_string(),
            documents,
            failures,
        };

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let bytes = serde_json::to_vec_pretty(&snapshot)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        log::info!(
            "Stored {} documents ({} failures) at {}",
            snapshot.documents.len(),
            snapshot.failures.len(),
            self.path.display()
        );
        self.snapshot = snapshot;
        Ok(())
    }
}

fn unix_now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use docsync_parser::parse_document;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[tokio::test]
    async fn missing_store_opens_empty() {
        let temp = TempDir::new().unwrap();
        let store = DocStore::open(temp.path().join("store.json")).await.unwrap();
        assert!(store.is_empty());
        assert_eq!(store.snapshot().schema_version, STORE_SCHEMA_VERSION);
    }

    #[tokio::test]
    async fn replace_all_swaps_the_whole_snapshot() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested/store.json");
        let mut store = DocStore::open(&path).await.unwrap();

        let first = parse_document("specs/a.md", "# A <!-- id: spec_a -->").unwrap();
        store
            .replace_all("docs", vec![first], Vec::new())
            .await
            .unwrap();

        let second = parse_document("specs/b.md", "# B <!-- id: spec_b -->").unwrap();
        let failure = ParseFailure {
            path: "123.md".to_string(),
            reason: "no usable id".to_string(),
        };
        store
            .replace_all("docs", vec![second], vec![failure.clone()])
            .await
            .unwrap();

        assert!(!temp.path().join("nested/store.json.tmp").exists());

        let reopened = DocStore::open(&path).await.unwrap();
        let ids: Vec<&str> = reopened.documents().iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["spec_b"]);
        assert_eq!(reopened.failures(), &[failure]);
        assert!(reopened.document("spec_a").is_none());
        assert_eq!(reopened.snapshot().root, "docs");
    }

    #[tokio::test]
    async fn corrupt_store_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("store.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = DocStore::open(&path).await.unwrap_err();
        assert!(matches!(err, IndexerError::JsonError(_)));
    }
}
