use crate::command::context::{CommandContext, ProjectContext};
use crate::command::domain::{
    depth_or_default, parse_payload, ChainPayload, CheckOutput, CommandOutcome, ImpactOutput,
    ImpactPayload, MissingFields,
};
use anyhow::{anyhow, Result};
use docsync_graph::{parse_relation_filter, GraphBuild};
use docsync_indexer::state_impact;
use serde_json::Value;

#[derive(Default)]
pub struct GraphService;

impl GraphService {
    pub async fn impact(&self, payload: Value, ctx: &CommandContext) -> Result<CommandOutcome> {
        let payload: ImpactPayload = parse_payload(payload)?;
        let node = payload.node.trim();
        if node.is_empty() {
            return Err(anyhow!("Node must not be empty"));
        }

        let project = ctx.open_workspace().await?;
        let config = project.workspace.config();
        let depth = depth_or_default(payload.depth, config.traversal.impact_depth);
        let build = project.workspace.build_graph();

        let report = build.graph.impacted_by(node, depth);
        let state = state_impact(&report, project.workspace.state());
        let mut outcome = CommandOutcome::from_value(ImpactOutput { report, state })?;
        finish(&mut outcome, project, &build);
        Ok(outcome)
    }

    pub async fn chain(&self, payload: Value, ctx: &CommandContext) -> Result<CommandOutcome> {
        let payload: ChainPayload = parse_payload(payload)?;
        let node = payload.node.trim();
        if node.is_empty() {
            return Err(anyhow!("Node must not be empty"));
        }
        let filter = payload
            .relation
            .as_deref()
            .map(parse_relation_filter)
            .transpose()?;

        let project = ctx.open_workspace().await?;
        let depth = depth_or_default(payload.depth, project.workspace.config().traversal.chain_depth);
        let build = project.workspace.build_graph();

        let chain = build.graph.relation_chain(node, filter, depth);
        let mut outcome = CommandOutcome::from_value(chain)?;
        finish(&mut outcome, project, &build);
        Ok(outcome)
    }

    pub async fn check(&self, ctx: &CommandContext) -> Result<CommandOutcome> {
        let project = ctx.open_workspace().await?;
        let workspace = &project.workspace;
        let build = workspace.build_graph();
        let registry = workspace.parser().registry();

        let missing_fields: Vec<MissingFields> = workspace
            .store()
            .documents()
            .iter()
            .filter_map(|doc| {
                let fields = registry.missing_fields(doc.doc_type, &doc.frontmatter);
                if fields.is_empty() {
                    return None;
                }
                Some(MissingFields {
                    path: doc.path.clone(),
                    id: doc.id.clone(),
                    doc_type: doc.doc_type.to_string(),
                    fields: fields.into_iter().map(str::to_string).collect(),
                })
            })
            .collect();

        let failures = workspace.store().failures().to_vec();
        let output = CheckOutput {
            ok: failures.is_empty() && build.issues.is_empty() && missing_fields.is_empty(),
            failures,
            issues: build.issues.clone(),
            missing_fields,
        };
        let mut outcome = CommandOutcome::from_value(output)?;
        finish(&mut outcome, project, &build);
        Ok(outcome)
    }
}

fn finish(outcome: &mut CommandOutcome, project: ProjectContext, build: &GraphBuild) {
    outcome.meta = project.meta();
    outcome.meta.graph_nodes = Some(build.graph.node_count());
    outcome.meta.graph_edges = Some(build.graph.edge_count());
    outcome.hints.extend(project.hints);
}
