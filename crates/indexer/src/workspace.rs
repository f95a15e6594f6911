use crate::config::DocsyncConfig;
use crate::error::{IndexerError, Result};
use crate::project::{ProjectIndex, ProjectState};
use crate::scanner::CorpusScanner;
use crate::store::DocStore;
use crate::sync::{sync_corpus, SyncStats};
use docsync_graph::{GraphBuild, GraphBuilder};
use docsync_parser::DocumentParser;
use std::path::{Path, PathBuf};

/// A project on disk: configuration, document store and the index/state records.
///
/// Each invocation opens its own workspace and builds its own graph from the stored
/// snapshot; nothing is shared between processes except the files.
pub struct Workspace {
    root: PathBuf,
    config: DocsyncConfig,
    store: DocStore,
    index: ProjectIndex,
    state: ProjectState,
    parser: DocumentParser,
}

impl Workspace {
    pub async fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(IndexerError::InvalidPath(format!(
                "project root {} is not a directory",
                root.display()
            )));
        }
        let root = root.canonicalize()?;
        let config = DocsyncConfig::load(&root).await?;
        let store = DocStore::open(config.store_file(&root)).await?;
        let index = ProjectIndex::load(&config.index_file(&root)).await?;
        let state = ProjectState::load(&config.state_file(&root)).await?;

        Ok(Self {
            root,
            config,
            store,
            index,
            state,
            parser: DocumentParser::default(),
        })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn config(&self) -> &DocsyncConfig {
        &self.config
    }

    #[must_use]
    pub fn store(&self) -> &DocStore {
        &self.store
    }

    #[must_use]
    pub fn index(&self) -> &ProjectIndex {
        &self.index
    }

    #[must_use]
    pub fn state(&self) -> &ProjectState {
        &self.state
    }

    #[must_use]
    pub fn parser(&self) -> &DocumentParser {
        &self.parser
    }

    /// Full destructive resync of the corpus into the store.
    pub async fn sync(&mut self) -> Result<SyncStats> {
        let scanner = CorpusScanner::new(self.config.docs_dir(&self.root));
        sync_corpus(&scanner, &self.parser, &mut self.store).await
    }

    /// Graph over the stored documents and the project index.
    #[must_use]
    pub fn build_graph(&self) -> GraphBuild {
        GraphBuilder::new(self.config.prd_path.as_str())
            .build(self.store.documents(), &self.index.documents)
    }
}
