use crate::command::context::CommandContext;
use crate::command::domain::{parse_payload, CommandOutcome, SearchOutput, SearchPayload};
use anyhow::Result;
use docsync_search::KeywordIndex;
use serde_json::Value;

#[derive(Default)]
pub struct SearchService;

impl SearchService {
    pub async fn run(&self, payload: Value, ctx: &CommandContext) -> Result<CommandOutcome> {
        let payload: SearchPayload = parse_payload(payload)?;
        let project = ctx.open_workspace().await?;
        let workspace = &project.workspace;

        let index = KeywordIndex::from_documents(workspace.store().documents())
            .with_limit(workspace.config().search.limit)?;
        let results = index.search(&payload.keywords);

        let mut outcome = CommandOutcome::from_value(SearchOutput {
            keywords: payload.keywords,
            results,
        })?;
        outcome.meta = project.meta();
        outcome.hints.extend(project.hints);
        Ok(outcome)
    }
}
