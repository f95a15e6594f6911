use docsync_parser::{DependencyKind, DocType, Document, RelationType};
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Node of the document graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    /// Document path for parsed documents, otherwise the referenced id or path.
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_type: Option<DocType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Referenced but never parsed (dependency targets without a file, artifact paths,
    /// PRD anchor nodes).
    pub is_virtual: bool,
}

impl GraphNode {
    #[must_use]
    pub fn for_document(doc: &Document) -> Self {
        Self {
            key: doc.path.clone(),
            doc_id: Some(doc.id.clone()),
            doc_type: Some(doc.doc_type),
            name: doc.name.clone(),
            is_virtual: false,
        }
    }

    #[must_use]
    pub fn virtual_node(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            doc_id: None,
            doc_type: None,
            name: None,
            is_virtual: true,
        }
    }

    /// Id when known, otherwise the key.
    #[must_use]
    pub fn label(&self) -> &str {
        self.doc_id.as_deref().unwrap_or(&self.key)
    }
}

/// Which evidence produced an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeSource {
    /// Dependencies/Consumers tables, `extends` frontmatter.
    Document,
    /// Markdown links.
    Link,
    /// Declared `dependencies` of a project index record.
    ProjectIndex,
    /// `feat_ref_<id>` anchors of the root PRD.
    PrdAnchor,
    /// Declared artifacts of code work items.
    Artifacts,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub relation: RelationType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependency: Option<DependencyKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub source: EdgeSource,
}

impl GraphEdge {
    #[must_use]
    pub const fn new(relation: RelationType, source: EdgeSource) -> Self {
        Self {
            relation,
            dependency: None,
            description: None,
            source,
        }
    }

    #[must_use]
    pub fn with_dependency(mut self, kind: Option<DependencyKind>) -> Self {
        self.dependency = kind;
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }
}

/// Directed multigraph of documents. Nodes are unique by key, edges unique by
/// `(source, target, relation)`; edge indices follow insertion order.
#[derive(Debug, Clone, Default)]
pub struct DocGraph {
    pub graph: DiGraph<GraphNode, GraphEdge>,
    pub(crate) keys: HashMap<String, NodeIndex>,
    pub(crate) aliases: HashMap<String, NodeIndex>,
    pub(crate) edge_keys: HashSet<(NodeIndex, NodeIndex, RelationType)>,
}

impl DocGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node, or return the existing one with the same key. A real node replaces the
    /// payload of a virtual one with the same key.
    pub fn add_node(&mut self, node: GraphNode) -> NodeIndex {
        if let Some(&idx) = self.keys.get(&node.key) {
            let existing = &mut self.graph[idx];
            if existing.is_virtual && !node.is_virtual {
                *existing = node;
            }
            return idx;
        }
        let key = node.key.clone();
        let idx = self.graph.add_node(node);
        self.keys.insert(key, idx);
        idx
    }

    /// Register `alias` (a document id) for `node`. The first registration wins.
    pub fn add_alias(&mut self, alias: impl Into<String>, node: NodeIndex) -> bool {
        let alias = alias.into();
        if self.aliases.contains_key(&alias) {
            return false;
        }
        self.aliases.insert(alias, node);
        true
    }

    /// Add an edge unless the same `(source, target, relation)` triple exists.
    pub fn add_edge(&mut self, from: NodeIndex, to: NodeIndex, edge: GraphEdge) -> Option<EdgeIndex> {
        if !self.edge_keys.insert((from, to, edge.relation)) {
            return None;
        }
        Some(self.graph.add_edge(from, to, edge))
    }

    /// Node by exact key.
    #[must_use]
    pub fn node_by_key(&self, key: &str) -> Option<NodeIndex> {
        self.keys.get(key).copied()
    }

    /// Node registered under a document id.
    #[must_use]
    pub fn node_by_alias(&self, alias: &str) -> Option<NodeIndex> {
        self.aliases.get(alias).copied()
    }

    /// Key first, then document id.
    #[must_use]
    pub fn find_node(&self, name: &str) -> Option<NodeIndex> {
        self.node_by_key(name).or_else(|| self.node_by_alias(name))
    }

    #[must_use]
    pub fn get_node(&self, idx: NodeIndex) -> Option<&GraphNode> {
        self.graph.node_weight(idx)
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeIndex, &GraphNode)> {
        self.graph
            .node_indices()
            .map(move |idx| (idx, &self.graph[idx]))
    }
}
