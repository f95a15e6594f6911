use crate::error::{GraphError, Result};
use crate::types::{DocGraph, GraphEdge, GraphNode};
use docsync_parser::RelationType;
use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::Serialize;
use std::collections::BTreeMap;

/// An edge as seen from a traversal: `(edge id, neighbour, payload)`.
pub type EdgeView<'a> = (EdgeIndex, NodeIndex, &'a GraphEdge);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphStats {
    pub nodes: usize,
    pub edges: usize,
    pub virtual_nodes: usize,
    pub edges_by_relation: BTreeMap<String, usize>,
}

impl DocGraph {
    /// Node for `name`: an existing key or document id, otherwise a new virtual node.
    pub fn endpoint(&mut self, name: &str) -> NodeIndex {
        match self.find_node(name) {
            Some(idx) => idx,
            None => self.add_node(GraphNode::virtual_node(name)),
        }
    }

    /// Outgoing edges of `node` in insertion order.
    #[must_use]
    pub fn outgoing(&self, node: NodeIndex) -> Vec<EdgeView<'_>> {
        self.ordered_edges(node, Direction::Outgoing)
    }

    /// Incoming edges of `node` in insertion order; the neighbour is the edge source.
    #[must_use]
    pub fn incoming(&self, node: NodeIndex) -> Vec<EdgeView<'_>> {
        self.ordered_edges(node, Direction::Incoming)
    }

    fn ordered_edges(&self, node: NodeIndex, direction: Direction) -> Vec<EdgeView<'_>> {
        // petgraph yields adjacency lists newest-first; traversal order must follow insertion.
        let mut edges: Vec<EdgeView<'_>> = self
            .graph
            .edges_directed(node, direction)
            .map(|e| {
                let neighbour = match direction {
                    Direction::Outgoing => e.target(),
                    Direction::Incoming => e.source(),
                };
                (e.id(), neighbour, e.weight())
            })
            .collect();
        edges.sort_by_key(|(id, _, _)| *id);
        edges
    }

    /// Key of a node; empty for an index that does not belong to this graph.
    #[must_use]
    pub fn key(&self, idx: NodeIndex) -> &str {
        self.get_node(idx).map_or("", |n| n.key.as_str())
    }

    /// Every edge as `(source key, target key, relation)` in insertion order.
    #[must_use]
    pub fn edge_triples(&self) -> Vec<(String, String, RelationType)> {
        self.graph
            .edge_indices()
            .filter_map(|e| {
                let (from, to) = self.graph.edge_endpoints(e)?;
                Some((
                    self.key(from).to_string(),
                    self.key(to).to_string(),
                    self.graph[e].relation,
                ))
            })
            .collect()
    }

    /// Node keys in insertion order.
    #[must_use]
    pub fn node_keys(&self) -> Vec<String> {
        self.nodes().map(|(_, n)| n.key.clone()).collect()
    }

    #[must_use]
    pub fn stats(&self) -> GraphStats {
        let mut edges_by_relation = BTreeMap::new();
        for edge in self.graph.edge_weights() {
            *edges_by_relation
                .entry(edge.relation.as_str().to_string())
                .or_insert(0) += 1;
        }
        GraphStats {
            nodes: self.node_count(),
            edges: self.edge_count(),
            virtual_nodes: self.nodes().filter(|(_, n)| n.is_virtual).count(),
            edges_by_relation,
        }
    }
}

/// Parse a relation filter given by a caller.
pub fn parse_relation_filter(name: &str) -> Result<RelationType> {
    RelationType::parse(name).ok_or_else(|| GraphError::UnknownRelation(name.to_string()))
}
