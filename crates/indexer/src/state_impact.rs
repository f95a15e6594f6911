use crate::project::{PendingDoc, ProjectState, Subtask};
use docsync_graph::{DocGraph, ImpactReport, RelationChain};
use docsync_parser::normalize_path;
use serde::Serialize;

/// Parts of the project state reached by an impact report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateImpact {
    pub active_work_items: Vec<String>,
    pub subtasks: Vec<Subtask>,
    pub pending_docs: Vec<PendingDoc>,
}

impl StateImpact {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.active_work_items.is_empty() && self.subtasks.is_empty() && self.pending_docs.is_empty()
    }
}

/// Active work items, their subtasks and pending docs touched by `report`.
///
/// The changed node itself counts as touched, so editing an active work item reports it.
/// Extra impact seeds do not: they are only starting points.
#[must_use]
pub fn state_impact(report: &ImpactReport, state: &ProjectState) -> StateImpact {
    let touched = |name: &str| {
        report.touches(name)
            || report.changed == name
            || report.seeds.first().is_some_and(|s| s == name)
    };

    let active_work_items: Vec<String> = state
        .active_work_items
        .iter()
        .filter(|id| touched(id.as_str()))
        .cloned()
        .collect();
    let subtasks = state
        .subtasks
        .iter()
        .filter(|s| active_work_items.contains(&s.workitem_id) || touched(s.workitem_id.as_str()))
        .cloned()
        .collect();
    let pending_docs = state
        .pending_docs
        .iter()
        .filter(|p| {
            let path = normalize_path(&p.path).unwrap_or_else(|_| p.path.clone());
            touched(path.as_str())
        })
        .cloned()
        .collect();

    StateImpact {
        active_work_items,
        subtasks,
        pending_docs,
    }
}

/// Relation chain of every active work item, in state order.
#[must_use]
pub fn work_item_chains(graph: &DocGraph, state: &ProjectState, max_depth: usize) -> Vec<RelationChain> {
    state
        .active_work_items
        .iter()
        .map(|id| graph.relation_chain(id, None, max_depth))
        .collect()
}
