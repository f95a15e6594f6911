use crate::index_record::IndexEntry;
use crate::types::{DocGraph, EdgeSource, GraphEdge, GraphNode};
use docsync_parser::{normalize_path, DocType, Document, RelationType};
use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

pub const DEFAULT_PRD_PATH: &str = "prd.md";

/// Prefix of the PRD anchors that cross-reference feature documents.
pub const FEATURE_REF_PREFIX: &str = "feat_ref_";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// Two documents claim the same id; the first by path keeps it.
    DuplicateId,
    /// Link to a `.md` file that is not part of the corpus.
    MissingLinkTarget,
    /// Link anchor not declared in the target document.
    MissingAnchor,
    /// Link whose target resolves above the corpus root.
    LinkOutsideCorpus,
}

impl IssueKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DuplicateId => "duplicate_id",
            Self::MissingLinkTarget => "missing_link_target",
            Self::MissingAnchor => "missing_anchor",
            Self::LinkOutsideCorpus => "link_outside_corpus",
        }
    }
}

/// Structural finding produced while building. Never stops the build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphIssue {
    pub kind: IssueKind,
    /// Document the finding belongs to.
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    pub message: String,
}

impl fmt::Display for GraphIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{}:{line}: {}", self.path, self.message),
            None => write!(f, "{}: {}", self.path, self.message),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct GraphBuild {
    pub graph: DocGraph,
    pub issues: Vec<GraphIssue>,
}

/// Builds a [`DocGraph`] from parsed documents and project index records.
///
/// Evidence is merged in a fixed order so that the edge insertion order (which drives
/// traversal order) does not depend on how the inputs were enumerated:
///
/// 1. document nodes, sorted by path, plus id aliases
/// 2. Dependencies/Consumers/extends relations
/// 3. markdown links (`references`)
/// 4. project index dependencies
/// 5. PRD `feat_ref_<id>` cross-references (`defines`)
/// 6. artifacts of code work items (`produces`, `tests`)
#[derive(Debug, Clone)]
pub struct GraphBuilder {
    prd_path: String,
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_PRD_PATH)
    }
}

impl GraphBuilder {
    #[must_use]
    pub fn new(prd_path: impl Into<String>) -> Self {
        let prd_path = prd_path.into();
        let prd_path = normalize_path(&prd_path).unwrap_or(prd_path);
        Self { prd_path }
    }

    #[must_use]
    pub fn prd_path(&self) -> &str {
        &self.prd_path
    }

    pub fn build(&self, documents: &[Document], index: &[IndexEntry]) -> GraphBuild {
        let mut documents: Vec<&Document> = documents.iter().collect();
        documents.sort_by(|a, b| a.path.cmp(&b.path).then_with(|| a.id.cmp(&b.id)));
        let mut index: Vec<&IndexEntry> = index.iter().collect();
        index.sort_by(|a, b| a.id.cmp(&b.id));

        let mut build = GraphBuild::default();

        // Phase 1: nodes and aliases
        let by_path = Self::add_documents(&mut build, &documents);
        for entry in &index {
            let Some(path) = entry.path.as_deref() else {
                continue;
            };
            let Ok(path) = normalize_path(path) else {
                continue;
            };
            if let Some(idx) = build.graph.node_by_key(&path) {
                build.graph.add_alias(entry.id.clone(), idx);
            }
        }

        // Phase 2: extracted relations
        for doc in &documents {
            for relation in &doc.relations {
                let from = build.graph.endpoint(&relation.source);
                let to = build.graph.endpoint(&relation.target);
                if from == to {
                    continue;
                }
                let edge = GraphEdge::new(relation.relation, EdgeSource::Document)
                    .with_dependency(relation.dependency)
                    .with_description(relation.description.clone());
                build.graph.add_edge(from, to, edge);
            }
        }

        // Phase 3: links
        for doc in &documents {
            Self::add_links(&mut build, doc, &by_path);
        }

        // Phase 4: declared index dependencies
        for entry in &index {
            if entry.dependencies.is_empty() {
                continue;
            }
            let from = build.graph.endpoint(&entry.id);
            for dep in &entry.dependencies {
                let to = build.graph.endpoint(&dep.id);
                if from == to {
                    continue;
                }
                let edge = GraphEdge::new(RelationType::Depends, EdgeSource::ProjectIndex)
                    .with_dependency(Some(dep.dependency_kind()));
                build.graph.add_edge(from, to, edge);
            }
        }

        // Phase 5: PRD cross-references
        self.add_prd_definitions(&mut build.graph, &documents, &index, &by_path);

        // Phase 6: artifacts
        for entry in &index {
            Self::add_artifacts(&mut build.graph, entry);
        }

        log::info!(
            "Built document graph: {} nodes, {} edges, {} issues",
            build.graph.node_count(),
            build.graph.edge_count(),
            build.issues.len()
        );
        build
    }

    fn add_documents<'d>(
        build: &mut GraphBuild,
        documents: &[&'d Document],
    ) -> HashMap<&'d str, &'d Document> {
        let mut by_path = HashMap::new();
        for &doc in documents {
            if by_path.contains_key(doc.path.as_str()) {
                log::warn!("{}: parsed twice, keeping the first record", doc.path);
                continue;
            }
            by_path.insert(doc.path.as_str(), doc);
            let idx = build.graph.add_node(GraphNode::for_document(doc));
            if !build.graph.add_alias(doc.id.clone(), idx) {
                let owner = build
                    .graph
                    .node_by_alias(&doc.id)
                    .map_or("", |owner| build.graph.key(owner))
                    .to_string();
                build.issues.push(GraphIssue {
                    kind: IssueKind::DuplicateId,
                    path: doc.path.clone(),
                    line: None,
                    message: format!("id `{}` is already used by {owner}", doc.id),
                });
            }
        }
        by_path
    }

    fn add_links(build: &mut GraphBuild, doc: &Document, by_path: &HashMap<&str, &Document>) {
        let Some(from) = build.graph.node_by_key(&doc.path) else {
            return;
        };
        for link in &doc.links {
            let Some(target_path) = link.path.as_deref() else {
                build.issues.push(GraphIssue {
                    kind: IssueKind::LinkOutsideCorpus,
                    path: doc.path.clone(),
                    line: Some(link.line),
                    message: format!("link `{}` points outside the corpus", link.raw),
                });
                continue;
            };

            match by_path.get(target_path) {
                Some(target) => {
                    if let Some(anchor) = link.anchor.as_deref() {
                        if !target.has_anchor(anchor) {
                            build.issues.push(GraphIssue {
                                kind: IssueKind::MissingAnchor,
                                path: doc.path.clone(),
                                line: Some(link.line),
                                message: format!("anchor `{anchor}` not found in {target_path}"),
                            });
                        }
                    }
                }
                None if target_path.ends_with(".md") => {
                    build.issues.push(GraphIssue {
                        kind: IssueKind::MissingLinkTarget,
                        path: doc.path.clone(),
                        line: Some(link.line),
                        message: format!("linked document {target_path} does not exist"),
                    });
                }
                None => {}
            }

            let to = build.graph.endpoint(target_path);
            if from != to {
                let edge = GraphEdge::new(RelationType::References, EdgeSource::Link)
                    .with_description(Some(link.text.clone()).filter(|t| !t.is_empty()));
                build.graph.add_edge(from, to, edge);
            }
        }
    }

    fn prd_node(&self, graph: &DocGraph, documents: &[&Document]) -> Option<(NodeIndex, String)> {
        if let Some(idx) = graph.node_by_key(&self.prd_path) {
            return Some((idx, self.prd_path.clone()));
        }
        let prd = documents.iter().find(|d| d.doc_type == DocType::Prd)?;
        graph
            .node_by_key(&prd.path)
            .map(|idx| (idx, prd.path.clone()))
    }

    fn add_prd_definitions(
        &self,
        graph: &mut DocGraph,
        documents: &[&Document],
        index: &[&IndexEntry],
        by_path: &HashMap<&str, &Document>,
    ) {
        let Some((prd, prd_path)) = self.prd_node(graph, documents) else {
            log::debug!("no PRD document at {}, skipping feature cross-references", self.prd_path);
            return;
        };
        let prd_doc = by_path.get(prd_path.as_str()).copied();

        let mut seen = HashSet::new();
        let mut features: Vec<&str> = Vec::new();
        let index_features = index.iter().filter(|e| {
            e.doc_type
                .as_deref()
                .and_then(DocType::parse)
                .is_some_and(|t| t == DocType::Feature)
        });
        for entry in index_features {
            if seen.insert(entry.id.as_str()) {
                features.push(&entry.id);
            }
        }
        for doc in documents.iter().filter(|d| d.doc_type == DocType::Feature) {
            if seen.insert(doc.id.as_str()) {
                features.push(&doc.id);
            }
        }

        for feature in features {
            let target = graph.endpoint(feature);
            if target == prd {
                continue;
            }
            let anchor = format!("{FEATURE_REF_PREFIX}{feature}");
            if prd_doc.is_some_and(|d| d.has_anchor(&anchor)) {
                let via = graph.add_node(GraphNode::virtual_node(format!("{prd_path}#{anchor}")));
                graph.add_edge(
                    prd,
                    via,
                    GraphEdge::new(RelationType::Defines, EdgeSource::PrdAnchor),
                );
                graph.add_edge(
                    via,
                    target,
                    GraphEdge::new(RelationType::Defines, EdgeSource::PrdAnchor),
                );
            } else {
                graph.add_edge(
                    prd,
                    target,
                    GraphEdge::new(RelationType::Defines, EdgeSource::PrdAnchor),
                );
            }
        }
    }

    fn add_artifacts(graph: &mut DocGraph, entry: &IndexEntry) {
        if !entry.is_code_work() {
            return;
        }
        let Some(artifacts) = entry.artifacts.as_ref() else {
            return;
        };
        let owner = graph.endpoint(&entry.id);

        let mut produced: Vec<&str> = Vec::new();
        produced.extend(artifacts.design.as_deref());
        produced.extend(artifacts.code.iter().map(String::as_str));
        produced.extend(artifacts.tests.iter().map(String::as_str));
        for path in produced {
            let node = graph.endpoint(&artifact_key(path));
            if node != owner {
                graph.add_edge(
                    owner,
                    node,
                    GraphEdge::new(RelationType::Produces, EdgeSource::Artifacts),
                );
            }
        }

        for test in &artifacts.tests {
            let test_node = graph.endpoint(&artifact_key(test));
            for code in &artifacts.code {
                let code_node = graph.endpoint(&artifact_key(code));
                if test_node != code_node {
                    graph.add_edge(
                        test_node,
                        code_node,
                        GraphEdge::new(RelationType::Tests, EdgeSource::Artifacts),
                    );
                }
            }
        }
    }
}

fn artifact_key(path: &str) -> String {
    normalize_path(path).unwrap_or_else(|_| path.trim().to_string())
}

/// Build with the default PRD location and drop the findings.
#[must_use]
pub fn build_graph(documents: &[Document], index: &[IndexEntry]) -> DocGraph {
    GraphBuilder::default().build(documents, index).graph
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index_record::{Artifacts, IndexDependency};
    use docsync_parser::parse_document;
    use pretty_assertions::assert_eq;

    fn doc(path: &str, content: &str) -> Document {
        parse_document(path, content).unwrap()
    }

    fn feature_entry(id: &str) -> IndexEntry {
        IndexEntry {
            id: id.to_string(),
            doc_type: Some("feature".to_string()),
            ..IndexEntry::default()
        }
    }

    fn triples(graph: &DocGraph) -> Vec<(String, String, RelationType)> {
        graph.edge_triples()
    }

    #[test]
    fn prd_anchor_becomes_intermediate_node() {
        let docs = vec![
            doc("prd.md", "# Product <!-- id: prd_main -->\n\n## Login <!-- id: feat_ref_feat_login -->\n"),
            doc("features/login.md", "# Login <!-- id: feat_login -->\n"),
            doc("features/signup.md", "# Signup <!-- id: feat_signup -->\n"),
        ];
        let build = GraphBuilder::default().build(&docs, &[feature_entry("feat_login")]);

        assert_eq!(
            triples(&build.graph),
            vec![
                (
                    "prd.md".to_string(),
                    "prd.md#feat_ref_feat_login".to_string(),
                    RelationType::Defines
                ),
                (
                    "prd.md#feat_ref_feat_login".to_string(),
                    "features/login.md".to_string(),
                    RelationType::Defines
                ),
                (
                    "prd.md".to_string(),
                    "features/signup.md".to_string(),
                    RelationType::Defines
                ),
            ]
        );
    }

    #[test]
    fn artifacts_cross_product_tests_with_code() {
        let entry = IndexEntry {
            id: "feat_cache".to_string(),
            work_mode: Some("code".to_string()),
            artifacts: Some(Artifacts {
                design: None,
                code: vec!["src/a.rs".to_string(), "src/b.rs".to_string()],
                tests: vec!["tests/t1.rs".to_string(), "tests/t2.rs".to_string()],
            }),
            ..IndexEntry::default()
        };
        let graph = build_graph(&[], &[entry]);
        let tests: Vec<(String, String)> = triples(&graph)
            .into_iter()
            .filter(|(_, _, r)| *r == RelationType::Tests)
            .map(|(s, t, _)| (s, t))
            .collect();
        assert_eq!(
            tests,
            vec![
                ("tests/t1.rs".to_string(), "src/a.rs".to_string()),
                ("tests/t1.rs".to_string(), "src/b.rs".to_string()),
                ("tests/t2.rs".to_string(), "src/a.rs".to_string()),
                ("tests/t2.rs".to_string(), "src/b.rs".to_string()),
            ]
        );
        assert_eq!(graph.stats().edges_by_relation.get("produces"), Some(&4));
    }

    #[test]
    fn artifacts_require_code_work_mode() {
        let entry = IndexEntry {
            id: "feat_docs".to_string(),
            artifacts: Some(Artifacts {
                design: Some("designs/x.md".to_string()),
                ..Artifacts::default()
            }),
            ..IndexEntry::default()
        };
        assert_eq!(build_graph(&[], &[entry]).edge_count(), 0);
    }

    #[test]
    fn index_dependencies_merge_with_tables() {
        let docs = vec![doc(
            "features/a.md",
            "# A <!-- id: feat_a -->\n\n## Dependencies\n\n| Dependency | Type |\n|---|---|\n| auth | soft |\n",
        )];
        let entry = IndexEntry {
            id: "feat_a".to_string(),
            path: Some("features/a.md".to_string()),
            dependencies: vec![
                IndexDependency {
                    id: "spec_auth".to_string(),
                    kind: Some("hard".to_string()),
                },
                IndexDependency {
                    id: "spec_store".to_string(),
                    kind: None,
                },
            ],
            ..IndexEntry::default()
        };
        let graph = build_graph(&docs, &[entry]);
        assert_eq!(
            triples(&graph),
            vec![
                ("features/a.md".to_string(), "spec_auth".to_string(), RelationType::Depends),
                ("features/a.md".to_string(), "spec_store".to_string(), RelationType::Depends),
            ]
        );
    }

    #[test]
    fn link_findings_do_not_stop_the_build() {
        let docs = vec![
            doc(
                "features/a.md",
                "# A <!-- id: feat_a -->\n\n[spec](../specs/auth.md#tokens) [gone](missing.md) [up](../../x.md) [code](../src/a.rs)\n",
            ),
            doc("specs/auth.md", "# Auth <!-- id: spec_auth -->\n"),
        ];
        let build = GraphBuilder::default().build(&docs, &[]);
        let kinds: Vec<IssueKind> = build.issues.iter().map(|i| i.kind).collect();
        assert_eq!(
            kinds,
            vec![
                IssueKind::MissingAnchor,
                IssueKind::MissingLinkTarget,
                IssueKind::LinkOutsideCorpus,
            ]
        );
        assert_eq!(build.graph.stats().edges_by_relation.get("references"), Some(&3));
        assert!(build.graph.get_node(build.graph.find_node("src/a.rs").unwrap()).unwrap().is_virtual);
    }

    #[test]
    fn duplicate_ids_are_reported() {
        let docs = vec![
            doc("specs/b.md", "# B <!-- id: spec_dup -->\n"),
            doc("specs/a.md", "# A <!-- id: spec_dup -->\n"),
        ];
        let build = GraphBuilder::default().build(&docs, &[]);
        assert_eq!(build.issues.len(), 1);
        assert_eq!(build.issues[0].path, "specs/b.md");
        assert_eq!(
            build.graph.find_node("spec_dup").map(|n| build.graph.key(n)),
            Some("specs/a.md")
        );
    }
}
