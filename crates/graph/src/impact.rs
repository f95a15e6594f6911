use crate::graph::EdgeView;
use crate::resolver::NodeResolver;
use crate::types::{DocGraph, GraphEdge};
use docsync_parser::{DependencyKind, RelationType};
use petgraph::graph::NodeIndex;
use serde::Serialize;
use std::collections::{HashSet, VecDeque};

pub const DEFAULT_IMPACT_DEPTH: usize = 2;

/// Zero is not a usable depth; it falls back to `default`.
#[must_use]
pub const fn normalize_depth(depth: usize, default: usize) -> usize {
    if depth == 0 {
        default
    } else {
        depth
    }
}

/// Whether a change to an edge's source propagates to its target.
///
/// `defines` and `produces` point from the upstream document to what it shapes. Every other
/// relation points from the dependent document to what it relies on, so a change flows
/// against the edge.
#[must_use]
pub const fn propagates_forward(relation: RelationType) -> bool {
    matches!(relation, RelationType::Defines | RelationType::Produces)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpactKind {
    Direct,
    Indirect,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Impact {
    /// Node key (document path, or the referenced name for virtual nodes).
    pub node: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub kind: ImpactKind,
    pub depth: usize,
    pub relation: RelationType,
    pub reason: String,
    /// Node through which an indirect impact was reached.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub via: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImpactReport {
    pub changed: String,
    /// Keys of the nodes the traversal started from.
    pub seeds: Vec<String>,
    pub direct: Vec<Impact>,
    pub indirect: Vec<Impact>,
}

impl ImpactReport {
    fn empty(changed: &str) -> Self {
        Self {
            changed: changed.to_string(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.direct.is_empty() && self.indirect.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.direct.len() + self.indirect.len()
    }

    /// Direct impacts, then indirect ones.
    pub fn all(&self) -> impl Iterator<Item = &Impact> {
        self.direct.iter().chain(self.indirect.iter())
    }

    /// Whether `name` (node key or document id) is impacted.
    #[must_use]
    pub fn touches(&self, name: &str) -> bool {
        self.all()
            .any(|i| i.node == name || i.doc_id.as_deref() == Some(name))
    }
}

fn reason(edge: &GraphEdge, upstream: &str) -> String {
    match edge.relation {
        RelationType::Depends => {
            let kind = edge.dependency.unwrap_or(DependencyKind::Hard);
            format!("{} dependency on {upstream}", kind.as_str())
        }
        RelationType::Extends => format!("extends {upstream}"),
        RelationType::Consumes => format!("consumes {upstream}"),
        RelationType::References => format!("references {upstream}"),
        RelationType::Tests => format!("tests {upstream}"),
        RelationType::Defines => format!("defined by {upstream}"),
        RelationType::Produces => format!("produced from {upstream}"),
    }
}

impl DocGraph {
    /// Nodes a change to `node` propagates to, in edge insertion order.
    fn impact_links(&self, node: NodeIndex) -> Vec<EdgeView<'_>> {
        let mut links: Vec<EdgeView<'_>> = self
            .outgoing(node)
            .into_iter()
            .filter(|(_, _, e)| propagates_forward(e.relation))
            .chain(
                self.incoming(node)
                    .into_iter()
                    .filter(|(_, _, e)| !propagates_forward(e.relation)),
            )
            .collect();
        links.sort_by_key(|(id, _, _)| *id);
        links
    }

    /// Documents that need review when `changed` changes.
    ///
    /// `changed` is resolved with [`NodeResolver::impact_seeds`]; an unknown name yields an
    /// empty report. `max_depth` of zero means [`DEFAULT_IMPACT_DEPTH`].
    #[must_use]
    pub fn impacted_by(&self, changed: &str, max_depth: usize) -> ImpactReport {
        let seeds: Vec<NodeIndex> = NodeResolver::new(self)
            .impact_seeds(changed)
            .into_iter()
            .map(|m| m.node)
            .collect();
        if seeds.is_empty() {
            log::debug!("impact: no node matches {changed:?}");
            return ImpactReport::empty(changed);
        }
        self.impacted_from(changed, &seeds, max_depth)
    }

    /// Breadth-first impact traversal from explicit seed nodes.
    ///
    /// The first seed is the changed node and is never reported. Further seeds are extra
    /// starting points and are reported like any other node they can be reached from.
    #[must_use]
    pub fn impacted_from(&self, changed: &str, seeds: &[NodeIndex], max_depth: usize) -> ImpactReport {
        let max_depth = normalize_depth(max_depth, DEFAULT_IMPACT_DEPTH);
        let mut report = ImpactReport::empty(changed);
        let origin = seeds.first().copied();
        report.seeds = seeds.iter().map(|&s| self.key(s).to_string()).collect();

        let mut visited: HashSet<(NodeIndex, usize)> = HashSet::new();
        let mut recorded: HashSet<NodeIndex> = HashSet::new();
        let mut queue: VecDeque<(NodeIndex, usize)> = VecDeque::new();
        for &seed in seeds {
            if visited.insert((seed, 0)) {
                queue.push_back((seed, 0));
            }
        }

        // Levels are drained in order, so every depth-1 hit is recorded before any deeper one.
        while let Some((current, depth)) = queue.pop_front() {
            if depth >= max_depth {
                continue;
            }
            let upstream = self.get_node(current).map_or("", |n| n.label());
            let next_depth = depth + 1;

            for (_, neighbour, edge) in self.impact_links(current) {
                if Some(neighbour) == origin {
                    continue;
                }
                if recorded.insert(neighbour) {
                    let Some(node) = self.get_node(neighbour) else {
                        continue;
                    };
                    let direct = next_depth == 1;
                    let impact = Impact {
                        node: node.key.clone(),
                        doc_id: node.doc_id.clone(),
                        name: node.name.clone(),
                        kind: if direct {
                            ImpactKind::Direct
                        } else {
                            ImpactKind::Indirect
                        },
                        depth: next_depth,
                        relation: edge.relation,
                        reason: reason(edge, upstream),
                        via: (!direct).then(|| self.key(current).to_string()),
                    };
                    if direct {
                        report.direct.push(impact);
                    } else {
                        report.indirect.push(impact);
                    }
                }
                if visited.insert((neighbour, next_depth)) {
                    queue.push_back((neighbour, next_depth));
                }
            }
        }

        log::debug!(
            "impact of {changed:?}: {} direct, {} indirect",
            report.direct.len(),
            report.indirect.len()
        );
        report
    }
}
