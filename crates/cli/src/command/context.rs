use crate::command::domain::{Hint, HintKind, ResponseMeta};
use anyhow::{Context, Result};
use docsync_indexer::Workspace;
use std::path::PathBuf;

pub struct CommandContext {
    root: PathBuf,
}

impl CommandContext {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub async fn open_workspace(&self) -> Result<ProjectContext> {
        let workspace = Workspace::open(&self.root)
            .await
            .with_context(|| format!("Failed to open project at {}", self.root.display()))?;

        let mut hints = Vec::new();
        if workspace.store().is_empty() {
            hints.push(Hint {
                kind: HintKind::Action,
                text: "Document store is empty; run `docsync sync` first.".to_string(),
            });
        }
        Ok(ProjectContext { workspace, hints })
    }
}

pub struct ProjectContext {
    pub workspace: Workspace,
    pub hints: Vec<Hint>,
}

impl ProjectContext {
    pub fn meta(&self) -> ResponseMeta {
        let snapshot = self.workspace.store().snapshot();
        ResponseMeta {
            store_path: Some(self.workspace.store().path().display().to_string()),
            synced_at_unix_ms: Some(snapshot.synced_at_unix_ms).filter(|ms| *ms > 0),
            documents: Some(snapshot.documents.len()),
            ..ResponseMeta::default()
        }
    }
}
