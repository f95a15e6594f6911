mod context;
pub mod domain;
mod services;

pub use domain::{CommandAction, CommandRequest, CommandResponse, CommandStatus};

use anyhow::Result;
use context::CommandContext;
use domain::CommandOutcome;
use services::Services;
use std::path::PathBuf;

#[derive(Default)]
pub struct CommandHandler {
    services: Services,
}

impl CommandHandler {
    pub async fn execute(&self, root: PathBuf, request: CommandRequest) -> Result<CommandResponse> {
        let CommandRequest { action, payload } = request;
        log::debug!("Executing {action:?}");

        let mut outcome: CommandOutcome = self
            .services
            .route(action, payload, &CommandContext::new(root))
            .await?;

        outcome.meta.duration_ms = outcome
            .meta
            .duration_ms
            .or_else(|| u64::try_from(outcome.started.elapsed().as_millis()).ok());

        Ok(CommandResponse {
            status: CommandStatus::Ok,
            message: None,
            hints: outcome.hints,
            data: outcome.data,
            meta: outcome.meta,
        })
    }
}

pub async fn execute(root: PathBuf, request: CommandRequest) -> Result<CommandResponse> {
    CommandHandler::default().execute(root, request).await
}
