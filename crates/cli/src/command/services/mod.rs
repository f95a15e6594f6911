mod graph;
mod search;
mod status;
mod sync;

use crate::command::context::CommandContext;
use crate::command::domain::{CommandAction, CommandOutcome};
use anyhow::Result;
use serde_json::Value;

#[derive(Default)]
pub struct Services {
    sync: sync::SyncService,
    graph: graph::GraphService,
    search: search::SearchService,
    status: status::StatusService,
}

impl Services {
    pub async fn route(
        &self,
        action: CommandAction,
        payload: Value,
        ctx: &CommandContext,
    ) -> Result<CommandOutcome> {
        match action {
            CommandAction::Sync => self.sync.run(ctx).await,
            CommandAction::Impact => self.graph.impact(payload, ctx).await,
            CommandAction::Chain => self.graph.chain(payload, ctx).await,
            CommandAction::Check => self.graph.check(ctx).await,
            CommandAction::Search => self.search.run(payload, ctx).await,
            CommandAction::Status => self.status.run(ctx).await,
        }
    }
}
