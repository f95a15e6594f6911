use crate::types::DocGraph;
use docsync_parser::{basename_slug, normalize_path};
use petgraph::graph::NodeIndex;
use serde::Serialize;

/// Shortest slug allowed to take part in substring matching.
pub const MIN_SUBSTRING_SLUG: usize = 3;

/// How a query matched a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchTier {
    /// Node key or document id, verbatim or after path normalisation.
    Exact,
    /// Normalised basename slug equal to the node's slug or id.
    Slug,
    /// Normalised basename slug contained in the node's slug or id.
    Substring,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeMatch {
    pub node: NodeIndex,
    pub tier: MatchTier,
}

/// Maps user-supplied names (paths, ids, dependency-table names) to graph nodes.
///
/// Policy: exact key/id, then normalised-slug equality, then substring containment.
pub struct NodeResolver<'g> {
    graph: &'g DocGraph,
}

impl<'g> NodeResolver<'g> {
    #[must_use]
    pub const fn new(graph: &'g DocGraph) -> Self {
        Self { graph }
    }

    /// Exact match on key or document id, also trying the normalised path form.
    #[must_use]
    pub fn resolve_exact(&self, name: &str) -> Option<NodeIndex> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        self.graph.find_node(name).or_else(|| {
            normalize_path(name)
                .ok()
                .and_then(|normalized| self.graph.find_node(&normalized))
        })
    }

    /// Best single match: exact, else the first node of the first non-empty fuzzy tier.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<NodeMatch> {
        if let Some(node) = self.resolve_exact(name) {
            return Some(NodeMatch {
                node,
                tier: MatchTier::Exact,
            });
        }
        self.fuzzy(name, |_| true).into_iter().next()
    }

    /// All nodes a change to `name` starts from, the changed node itself first.
    ///
    /// Without an exact match this is the first non-empty fuzzy tier. With one, fuzzy
    /// matching only adds virtual nodes: a file is often cited under a different name
    /// (`templates/feature-spec.md` appears as `feature-spec-template` in dependency tables),
    /// but a parsed document that merely shares part of the name is a different document.
    #[must_use]
    pub fn impact_seeds(&self, name: &str) -> Vec<NodeMatch> {
        let Some(exact) = self.resolve_exact(name) else {
            return self.fuzzy(name, |_| true);
        };
        let mut seeds = vec![NodeMatch {
            node: exact,
            tier: MatchTier::Exact,
        }];
        seeds.extend(self.fuzzy(name, |idx| {
            idx != exact && self.graph.get_node(idx).is_some_and(|n| n.is_virtual)
        }));
        seeds
    }

    fn fuzzy(&self, name: &str, accept: impl Fn(NodeIndex) -> bool) -> Vec<NodeMatch> {
        let slug = basename_slug(name.trim());
        if slug.is_empty() {
            return Vec::new();
        }

        let accept = &accept;
        let candidates = || self.graph.nodes().filter(move |(idx, _)| accept(*idx));

        let equal: Vec<NodeMatch> = candidates()
            .filter(|(_, node)| {
                basename_slug(&node.key) == slug || node.doc_id.as_deref() == Some(slug.as_str())
            })
            .map(|(node, _)| NodeMatch {
                node,
                tier: MatchTier::Slug,
            })
            .collect();
        if !equal.is_empty() || slug.len() < MIN_SUBSTRING_SLUG {
            return equal;
        }

        candidates()
            .filter(|(_, node)| {
                basename_slug(&node.key).contains(&slug)
                    || node.doc_id.as_deref().is_some_and(|id| id.contains(&slug))
            })
            .map(|(node, _)| NodeMatch {
                node,
                tier: MatchTier::Substring,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GraphNode;

    fn graph_with(keys: &[&str]) -> DocGraph {
        let mut graph = DocGraph::new();
        for key in keys {
            graph.add_node(GraphNode::virtual_node(*key));
        }
        graph
    }

    #[test]
    fn exact_match_normalises_paths() {
        let graph = graph_with(&["specs/auth.md"]);
        let resolver = NodeResolver::new(&graph);
        assert!(resolver.resolve_exact("./specs/auth.md").is_some());
        assert_eq!(resolver.resolve("specs/auth.md").map(|m| m.tier), Some(MatchTier::Exact));
    }

    #[test]
    fn slug_equality_beats_substring() {
        let graph = graph_with(&["feature_spec", "feature_spec_template"]);
        let resolver = NodeResolver::new(&graph);
        let seeds = resolver.impact_seeds("templates/feature-spec.md");
        assert_eq!(seeds.len(), 1);
        assert_eq!(graph.key(seeds[0].node), "feature_spec");
        assert_eq!(seeds[0].tier, MatchTier::Slug);
    }

    #[test]
    fn substring_is_the_last_resort() {
        let graph = graph_with(&["templates/feature-spec.md", "feature_spec_template", "auth"]);
        let resolver = NodeResolver::new(&graph);
        let seeds = resolver.impact_seeds("templates/feature-spec.md");
        let keys: Vec<(&str, MatchTier)> = seeds
            .iter()
            .map(|m| (graph.key(m.node), m.tier))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("templates/feature-spec.md", MatchTier::Exact),
                ("feature_spec_template", MatchTier::Substring),
            ]
        );
    }

    #[test]
    fn short_slugs_never_substring_match() {
        let graph = graph_with(&["spec_ab_long"]);
        let resolver = NodeResolver::new(&graph);
        assert!(resolver.impact_seeds("ab").is_empty());
        assert!(resolver.resolve("").is_none());
    }

    #[test]
    fn exact_match_only_adds_virtual_namesakes() {
        let mut graph = graph_with(&["auth_service"]);
        for (path, id) in [("specs/auth.md", "spec_auth"), ("specs/auth-tokens.md", "spec_auth_tokens")] {
            let idx = graph.add_node(GraphNode {
                doc_id: Some(id.to_string()),
                is_virtual: false,
                ..GraphNode::virtual_node(path)
            });
            graph.add_alias(id, idx);
        }
        let resolver = NodeResolver::new(&graph);

        let keys: Vec<&str> = resolver
            .impact_seeds("specs/auth.md")
            .iter()
            .map(|m| graph.key(m.node))
            .collect();
        assert_eq!(keys, vec!["specs/auth.md", "auth_service"]);

        let keys: Vec<&str> = resolver
            .impact_seeds("spec_auth")
            .iter()
            .map(|m| graph.key(m.node))
            .collect();
        assert_eq!(keys, vec!["specs/auth.md"]);
    }
}
