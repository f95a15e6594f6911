use crate::impact::normalize_depth;
use crate::resolver::NodeResolver;
use crate::types::DocGraph;
use docsync_parser::RelationType;
use petgraph::graph::NodeIndex;
use serde::Serialize;
use std::collections::{HashSet, VecDeque};

pub const DEFAULT_CHAIN_DEPTH: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainEdge {
    pub source: String,
    pub target: String,
    pub relation: RelationType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Reachability closure from a start node. `nodes` is in first-discovery order and starts
/// with the start node itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RelationChain {
    pub start: String,
    pub nodes: Vec<String>,
    pub edges: Vec<ChainEdge>,
}

impl RelationChain {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl DocGraph {
    /// Breadth-first walk over outgoing edges, optionally restricted to one relation type.
    ///
    /// Nodes are reported by document id when known. An unknown start yields an empty chain.
    #[must_use]
    pub fn relation_chain(
        &self,
        start: &str,
        filter: Option<RelationType>,
        max_depth: usize,
    ) -> RelationChain {
        let mut chain = RelationChain {
            start: start.to_string(),
            ..RelationChain::default()
        };
        let Some(found) = NodeResolver::new(self).resolve(start) else {
            return chain;
        };
        let max_depth = normalize_depth(max_depth, DEFAULT_CHAIN_DEPTH);
        let label = |idx: NodeIndex| {
            self.get_node(idx)
                .map_or_else(String::new, |n| n.label().to_string())
        };

        let mut seen: HashSet<NodeIndex> = HashSet::from([found.node]);
        let mut queue: VecDeque<(NodeIndex, usize)> = VecDeque::from([(found.node, 0)]);
        chain.nodes.push(label(found.node));

        while let Some((current, depth)) = queue.pop_front() {
            if depth >= max_depth {
                continue;
            }
            for (_, target, edge) in self.outgoing(current) {
                if filter.is_some_and(|f| f != edge.relation) {
                    continue;
                }
                chain.edges.push(ChainEdge {
                    source: label(current),
                    target: label(target),
                    relation: edge.relation,
                    description: edge.description.clone(),
                });
                if seen.insert(target) {
                    chain.nodes.push(label(target));
                    queue.push_back((target, depth + 1));
                }
            }
        }
        chain
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EdgeSource, GraphEdge};
    use pretty_assertions::assert_eq;

    fn graph(edges: &[(&str, &str, RelationType)]) -> DocGraph {
        let mut graph = DocGraph::new();
        for (from, to, relation) in edges {
            let a = graph.endpoint(from);
            let b = graph.endpoint(to);
            graph.add_edge(a, b, GraphEdge::new(*relation, EdgeSource::Document));
        }
        graph
    }

    #[test]
    fn linear_chain_in_discovery_order() {
        let graph = graph(&[
            ("node_a", "node_b", RelationType::Defines),
            ("node_b", "node_c", RelationType::Produces),
            ("node_c", "node_d", RelationType::Tests),
        ]);
        let chain = graph.relation_chain("node_a", None, 5);
        assert_eq!(chain.nodes, vec!["node_a", "node_b", "node_c", "node_d"]);
        assert_eq!(chain.edges.len(), 3);
        assert_eq!(chain.edges[1].relation, RelationType::Produces);
    }

    #[test]
    fn filter_and_depth_bound_the_walk() {
        let graph = graph(&[
            ("node_a", "node_b", RelationType::Depends),
            ("node_a", "node_x", RelationType::References),
            ("node_b", "node_c", RelationType::Depends),
        ]);
        let chain = graph.relation_chain("node_a", Some(RelationType::Depends), 1);
        assert_eq!(chain.nodes, vec!["node_a", "node_b"]);
        assert_eq!(chain.edges.len(), 1);
    }

    #[test]
    fn cycles_enqueue_each_node_once() {
        let graph = graph(&[
            ("node_a", "node_b", RelationType::Depends),
            ("node_b", "node_a", RelationType::Depends),
        ]);
        let chain = graph.relation_chain("node_a", None, 5);
        assert_eq!(chain.nodes, vec!["node_a", "node_b"]);
        assert_eq!(chain.edges.len(), 2);
    }

    #[test]
    fn unknown_start_is_empty() {
        let graph = graph(&[("node_a", "node_b", RelationType::Depends)]);
        assert!(graph.relation_chain("zzz", None, 5).is_empty());
    }
}
