use docsync_indexer::{state_impact, work_item_chains, IndexerError, Workspace};
use docsync_parser::RelationType;
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn project() -> TempDir {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(
        root,
        "docs/prd.md",
        "# Product <!-- id: prd_main -->\n\n## Login <!-- id: feat_ref_feat_login -->\n",
    );
    write(
        root,
        "docs/features/login.md",
        "# Login <!-- id: feat_login -->\n\n## Dependencies\n\n| Dependency | Type |\n|---|---|\n| auth | hard |\n",
    );
    write(root, "docs/specs/auth.md", "# Auth <!-- id: spec_auth -->\n");
    write(root, "docs/42.md", "just notes\n");
    write(
        root,
        ".docsync/index.json",
        r#"[{"id": "feat_login", "type": "feature", "path": "features/login.md", "workMode": "code",
             "artifacts": {"code": ["src/login.rs"], "tests": ["tests/login.rs"]}}]"#,
    );
    write(
        root,
        ".docsync/state.json",
        r#"{"activeWorkItems": ["feat_login"],
            "subtasks": [{"id": "st_form", "workitemId": "feat_login", "status": "todo"}],
            "pendingDocs": [{"path": "specs/auth.md"}]}"#,
    );
    temp
}

#[tokio::test]
async fn sync_persists_documents_and_failures() {
    let temp = project();
    let mut workspace = Workspace::open(temp.path()).await.unwrap();
    let stats = workspace.sync().await.unwrap();

    assert_eq!(stats.files, 4);
    assert_eq!(stats.documents, 3);
    assert_eq!(stats.failures, 1);
    assert_eq!(stats.by_type.get("feature"), Some(&1));

    let reopened = Workspace::open(temp.path()).await.unwrap();
    assert_eq!(reopened.store().documents().len(), 3);
    assert_eq!(reopened.store().failures()[0].path, "42.md");
    assert!(reopened.store().document("spec_auth").is_some());
}

#[tokio::test]
async fn graph_combines_documents_index_and_prd_anchors() {
    let temp = project();
    let mut workspace = Workspace::open(temp.path()).await.unwrap();
    workspace.sync().await.unwrap();

    let build = workspace.build_graph();
    let triples = build.graph.edge_triples();
    let has = |from: &str, to: &str, relation: RelationType| {
        triples
            .iter()
            .any(|(f, t, r)| f == from && t == to && *r == relation)
    };

    assert!(has("features/login.md", "specs/auth.md", RelationType::Depends));
    assert!(has("prd.md", "prd.md#feat_ref_feat_login", RelationType::Defines));
    assert!(has("prd.md#feat_ref_feat_login", "features/login.md", RelationType::Defines));
    assert!(has("features/login.md", "src/login.rs", RelationType::Produces));
    assert!(has("features/login.md", "tests/login.rs", RelationType::Produces));
    assert!(has("tests/login.rs", "src/login.rs", RelationType::Tests));
}

#[tokio::test]
async fn impact_reaches_artifacts_and_project_state() {
    let temp = project();
    let mut workspace = Workspace::open(temp.path()).await.unwrap();
    workspace.sync().await.unwrap();
    let build = workspace.build_graph();

    let report = build.graph.impacted_by("spec_auth", 2);
    let direct: Vec<&str> = report.direct.iter().map(|i| i.node.as_str()).collect();
    let indirect: Vec<&str> = report.indirect.iter().map(|i| i.node.as_str()).collect();
    assert_eq!(direct, vec!["features/login.md"]);
    assert_eq!(indirect, vec!["src/login.rs", "tests/login.rs"]);
    assert_eq!(report.indirect[0].via.as_deref(), Some("features/login.md"));

    let state = state_impact(&report, workspace.state());
    assert_eq!(state.active_work_items, vec!["feat_login"]);
    assert_eq!(state.subtasks.len(), 1);
    assert_eq!(state.pending_docs.len(), 1);

    let chains = work_item_chains(&build.graph, workspace.state(), 5);
    assert_eq!(chains.len(), 1);
    assert_eq!(chains[0].start, "feat_login");
    assert!(chains[0].nodes.contains(&"spec_auth".to_string()));
}

#[tokio::test]
async fn corrupt_index_is_reported() {
    let temp = project();
    write(temp.path(), ".docsync/index.json", "{not json");
    assert!(matches!(
        Workspace::open(temp.path()).await,
        Err(IndexerError::JsonError(_))
    ));
}
