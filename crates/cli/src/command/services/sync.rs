use crate::command::context::CommandContext;
use crate::command::domain::{CommandOutcome, Hint, HintKind, SyncOutput};
use anyhow::Result;

#[derive(Default)]
pub struct SyncService;

impl SyncService {
    pub async fn run(&self, ctx: &CommandContext) -> Result<CommandOutcome> {
        let mut project = ctx.open_workspace().await?;
        let stats = project.workspace.sync().await?;
        let build = project.workspace.build_graph();

        let mut hints = Vec::new();
        if stats.failures > 0 {
            hints.push(Hint {
                kind: HintKind::Warn,
                text: format!(
                    "{} file(s) produced no document; run `docsync check` for details.",
                    stats.failures
                ),
            });
        }
        if !build.issues.is_empty() {
            hints.push(Hint {
                kind: HintKind::Info,
                text: format!("{} structural finding(s); see `docsync check`.", build.issues.len()),
            });
        }

        let mut outcome = CommandOutcome::from_value(SyncOutput {
            stats,
            graph: build.graph.stats(),
            graph_issues: build.issues.len(),
        })?;
        outcome.meta = project.meta();
        outcome.meta.graph_nodes = Some(build.graph.node_count());
        outcome.meta.graph_edges = Some(build.graph.edge_count());
        outcome.hints = hints;
        Ok(outcome)
    }
}
