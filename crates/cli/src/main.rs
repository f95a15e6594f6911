//! `docsync` command line.
//!
//! Every subcommand prints one JSON envelope on stdout:
//!
//! ```json
//! {"status": "ok", "hints": [...], "data": {...}, "meta": {"duration_ms": 3}}
//! ```
//!
//! Errors use the same envelope with `"status": "error"` and exit with code 1.
//! Logs go to stderr and are controlled by `RUST_LOG`.

mod command;

use clap::{Parser, Subcommand};
use command::{CommandAction, CommandRequest, CommandResponse};
use env_logger::{Builder, Env, Target};
use serde_json::json;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(
    name = "docsync",
    version,
    about = "Keep a markdown documentation corpus in sync with its dependency graph",
    propagate_version = true
)]
struct Cli {
    /// Project root holding `.docsync/` and the corpus directory.
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    /// Pretty-print the JSON response.
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rescan the corpus and rebuild the document store.
    Sync,
    /// Documents affected by a change to NODE.
    Impact {
        /// Document id, path or name fragment.
        node: String,
        /// Traversal depth; zero or negative uses the configured default.
        #[arg(long, allow_negative_numbers = true)]
        depth: Option<i64>,
    },
    /// Relation chain reachable from NODE.
    Chain {
        node: String,
        /// Only follow edges of this relation type.
        #[arg(long = "type")]
        relation: Option<String>,
        #[arg(long, allow_negative_numbers = true)]
        depth: Option<i64>,
    },
    /// Rank documents by keyword matches.
    Search {
        #[arg(required = true)]
        keywords: Vec<String>,
    },
    /// Report parse failures, broken links and missing frontmatter fields.
    Check,
    /// Active work items with their subtasks and relation chains.
    Status,
}

impl Commands {
    fn into_request(self) -> CommandRequest {
        let (action, payload) = match self {
            Self::Sync => (CommandAction::Sync, json!({})),
            Self::Impact { node, depth } => (CommandAction::Impact, json!({"node": node, "depth": depth})),
            Self::Chain {
                node,
                relation,
                depth,
            } => (
                CommandAction::Chain,
                json!({"node": node, "type": relation, "depth": depth}),
            ),
            Self::Search { keywords } => (CommandAction::Search, json!({"keywords": keywords})),
            Self::Check => (CommandAction::Check, json!({})),
            Self::Status => (CommandAction::Status, json!({})),
        };
        CommandRequest { action, payload }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    Builder::from_env(Env::default().default_filter_or("warn"))
        .target(Target::Stderr)
        .init();

    let cli = Cli::parse();
    let request = cli.command.into_request();

    let response = match command::execute(cli.root, request).await {
        Ok(response) => response,
        Err(err) => {
            log::debug!("Command failed: {err:?}");
            CommandResponse::error(format!("{err:#}"))
        }
    };

    let rendered = if cli.pretty {
        serde_json::to_string_pretty(&response)
    } else {
        serde_json::to_string(&response)
    };
    match rendered {
        Ok(text) => println!("{text}"),
        Err(err) => {
            eprintln!("Failed to render response: {err}");
            return ExitCode::FAILURE;
        }
    }

    if response.is_error() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
