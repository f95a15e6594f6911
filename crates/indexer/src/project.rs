//! Project index and state records kept next to the corpus.
//!
//! Both files are produced by other tools; this crate only reads them.

use crate::error::Result;
use docsync_graph::IndexEntry;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Index file contents: `{"documents": [...]}` or a bare array of entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectIndex {
    #[serde(default)]
    pub documents: Vec<IndexEntry>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IndexFile {
    Bare(Vec<IndexEntry>),
    Wrapped(ProjectIndex),
}

impl ProjectIndex {
    pub fn from_json(content: &str) -> Result<Self> {
        Ok(match serde_json::from_str::<IndexFile>(content)? {
            IndexFile::Wrapped(index) => index,
            IndexFile::Bare(documents) => Self { documents },
        })
    }

    /// Load the index; a missing file is an empty index.
    pub async fn load(path: &Path) -> Result<Self> {
        match read_optional(path).await? {
            Some(content) => Self::from_json(&content),
            None => Ok(Self::default()),
        }
    }

    #[must_use]
    pub fn entry(&self, id: &str) -> Option<&IndexEntry> {
        self.documents.iter().find(|e| e.id == id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subtask {
    pub id: String,
    #[serde(default)]
    pub workitem_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingDoc {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Mutable project state. Used as traversal seeds only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectState {
    #[serde(default)]
    pub active_work_items: Vec<String>,
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
    #[serde(default)]
    pub pending_docs: Vec<PendingDoc>,
}

impl ProjectState {
    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Load the state file; a missing file is an empty state.
    pub async fn load(path: &Path) -> Result<Self> {
        match read_optional(path).await? {
            Some(content) => Self::from_json(&content),
            None => Ok(Self::default()),
        }
    }

    pub fn subtasks_of<'a>(&'a self, workitem_id: &'a str) -> impl Iterator<Item = &'a Subtask> {
        self.subtasks
            .iter()
            .filter(move |s| s.workitem_id == workitem_id)
    }
}

async fn read_optional(path: &Path) -> Result<Option<String>> {
    if !path.exists() {
        log::debug!("{} not found, treating as empty", path.display());
        return Ok(None);
    }
    Ok(Some(tokio::fs::read_to_string(path).await?))
}
