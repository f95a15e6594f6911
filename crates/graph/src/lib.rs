//! # Docsync Graph
//!
//! Directed document graph with impact analysis and relation chains.
//!
//! ## Features
//!
//! - **Graph building** - merge tables, links, project index and PRD anchors into one graph
//! - **Impact analysis** - direct and transitive dependents of a changed document
//! - **Relation chains** - breadth-first reachability, optionally by relation type
//! - **Structural findings** - dangling links and anchors, reported without failing
//!
//! ## Architecture
//!
//! ```text
//! Document[] + IndexEntry[]
//!     │
//!     ├──> Graph Builder
//!     │      ├─ Nodes: documents (keyed by path), virtual targets
//!     │      ├─ Edges: depends, consumes, extends, references
//!     │      ├─ Edges: defines (PRD anchors), produces / tests (artifacts)
//!     │      └─ GraphIssue findings
//!     │
//!     ├──> DocGraph (petgraph)
//!     │      └─ edges unique by (source, target, relation), kept in insertion order
//!     │
//!     └──> Traversal
//!            ├─ NodeResolver: exact → slug → substring
//!            ├─ impacted_by: BFS over propagation links, direct before indirect
//!            └─ relation_chain: BFS over outgoing edges
//! ```

mod builder;
mod chain;
mod error;
mod graph;
mod impact;
mod index_record;
mod resolver;
mod types;

pub use builder::{
    build_graph, GraphBuild, GraphBuilder, GraphIssue, IssueKind, DEFAULT_PRD_PATH,
    FEATURE_REF_PREFIX,
};
pub use chain::{ChainEdge, RelationChain, DEFAULT_CHAIN_DEPTH};
pub use error::{GraphError, Result};
pub use graph::{parse_relation_filter, EdgeView, GraphStats};
pub use impact::{
    normalize_depth, propagates_forward, Impact, ImpactKind, ImpactReport, DEFAULT_IMPACT_DEPTH,
};
pub use index_record::{Artifacts, IndexDependency, IndexEntry};
pub use resolver::{MatchTier, NodeMatch, NodeResolver, MIN_SUBSTRING_SLUG};
pub use types::{DocGraph, EdgeSource, GraphEdge, GraphNode};
