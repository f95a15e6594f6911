use crate::command::context::CommandContext;
use crate::command::domain::{CommandOutcome, Hint, HintKind, StatusOutput, WorkItemStatus};
use anyhow::Result;
use docsync_indexer::work_item_chains;
use docsync_parser::Document;

#[derive(Default)]
pub struct StatusService;

impl StatusService {
    pub async fn run(&self, ctx: &CommandContext) -> Result<CommandOutcome> {
        let project = ctx.open_workspace().await?;
        let workspace = &project.workspace;
        let state = workspace.state();
        let build = workspace.build_graph();

        let hints: Vec<Hint> = state
            .active_work_items
            .iter()
            .filter_map(|id| workspace.store().document(id))
            .filter_map(work_item_hint)
            .collect();

        let active_work_items = state
            .active_work_items
            .iter()
            .map(|id| {
                let doc = workspace.store().document(id);
                let entry = workspace.index().entry(id);
                WorkItemStatus {
                    id: id.clone(),
                    path: doc
                        .map(|d| d.path.clone())
                        .or_else(|| entry.and_then(|e| e.path.clone())),
                    name: doc.and_then(|d| d.name.clone()),
                    status: doc
                        .map(|d| d.status.to_string())
                        .or_else(|| entry.and_then(|e| e.status.clone())),
                    subtasks: state.subtasks_of(id).cloned().collect(),
                }
            })
            .collect();

        let chains = work_item_chains(&build.graph, state, workspace.config().traversal.chain_depth);
        let mut outcome = CommandOutcome::from_value(StatusOutput {
            active_work_items,
            pending_docs: state.pending_docs.clone(),
            chains,
        })?;
        outcome.meta = project.meta();
        outcome.meta.graph_nodes = Some(build.graph.node_count());
        outcome.meta.graph_edges = Some(build.graph.edge_count());
        outcome.hints = hints;
        outcome.hints.extend(project.hints);
        Ok(outcome)
    }
}

/// Flags an active entry whose document is not a work item, or is already finished.
fn work_item_hint(doc: &Document) -> Option<Hint> {
    if !doc.doc_type.is_work_item() {
        return Some(Hint {
            kind: HintKind::Warn,
            text: format!(
                "Active work item {} is a {} document, not a feature, capability or flow.",
                doc.id, doc.doc_type
            ),
        });
    }
    if doc.status.is_finished() {
        return Some(Hint {
            kind: HintKind::Info,
            text: format!("Active work item {} is already {}.", doc.id, doc.status),
        });
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use docsync_parser::parse_document;

    #[test]
    fn active_entries_are_checked_against_their_documents() {
        let open = parse_document("features/login.md", "# Login <!-- id: feat_login -->\n").unwrap();
        assert!(work_item_hint(&open).is_none());

        let done = parse_document(
            "flows/checkout.md",
            "---\nstatus: done\n---\n# Checkout <!-- id: flow_checkout -->\n",
        )
        .unwrap();
        let hint = work_item_hint(&done).unwrap();
        assert_eq!(hint.kind, HintKind::Info);
        assert!(hint.text.contains("already done"));

        let spec = parse_document("specs/auth.md", "# Auth <!-- id: spec_auth -->\n").unwrap();
        let hint = work_item_hint(&spec).unwrap();
        assert_eq!(hint.kind, HintKind::Warn);
        assert!(hint.text.contains("spec document"));
    }
}
