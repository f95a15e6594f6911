//! # Docsync Indexer
//!
//! Everything between the markdown corpus on disk and the document graph.
//!
//! ## Pipeline
//!
//! ```text
//! Project root
//!     │
//!     ├──> Config (.docsync/config.toml, defaults when absent)
//!     │
//!     ├──> Corpus Scanner (.gitignore aware, sorted *.md)
//!     │      └─> (path, content)
//!     │
//!     ├──> Parser
//!     │      └─> Documents + ParseFailures
//!     │
//!     ├──> Document Store (JSON snapshot, atomic replace)
//!     │
//!     └──> Project index + state (read only)
//!            └─> graph build, state-seeded impact
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use docsync_indexer::Workspace;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), docsync_indexer::IndexerError> {
//!     let mut workspace = Workspace::open(".").await?;
//!     let stats = workspace.sync().await?;
//!
//!     println!("Synced {} documents, {} failures", stats.documents, stats.failures);
//!     Ok(())
//! }
//! ```

mod config;
mod error;
mod project;
mod scanner;
mod state_impact;
mod store;
mod sync;
mod workspace;

pub use config::{DocsyncConfig, SearchConfig, TraversalConfig, CONFIG_DIR, CONFIG_FILE_NAME};
pub use error::{IndexerError, Result};
pub use project::{PendingDoc, ProjectIndex, ProjectState, Subtask};
pub use scanner::{CorpusFile, CorpusScanner};
pub use state_impact::{state_impact, work_item_chains, StateImpact};
pub use store::{DocStore, ParseFailure, StoreSnapshot, STORE_SCHEMA_VERSION};
pub use sync::{sync_corpus, SyncStats};
pub use workspace::Workspace;
