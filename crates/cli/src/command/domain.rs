use anyhow::Result;
use docsync_graph::{GraphIssue, GraphStats, ImpactReport, RelationChain};
use docsync_indexer::{ParseFailure, PendingDoc, StateImpact, Subtask, SyncStats};
use docsync_search::RankedDocument;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;

#[derive(Debug, Deserialize)]
pub struct CommandRequest {
    pub action: CommandAction,
    #[serde(default = "empty_payload")]
    pub payload: Value,
}

fn empty_payload() -> Value {
    Value::Object(serde_json::Map::default())
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CommandAction {
    Sync,
    Impact,
    Chain,
    Search,
    Check,
    Status,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ImpactPayload {
    pub node: String,
    #[serde(default)]
    pub depth: Option<i64>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ChainPayload {
    pub node: String,
    #[serde(default, rename = "type")]
    pub relation: Option<String>,
    #[serde(default)]
    pub depth: Option<i64>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SearchPayload {
    #[serde(default)]
    pub keywords: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct CommandResponse {
    pub status: CommandStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hints: Vec<Hint>,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub meta: ResponseMeta,
}

impl CommandResponse {
    pub fn is_error(&self) -> bool {
        matches!(self.status, CommandStatus::Error)
    }

    pub fn error(message: String) -> Self {
        let hints = classify_error(&message);
        Self {
            status: CommandStatus::Error,
            message: Some(message),
            hints,
            data: Value::Null,
            meta: ResponseMeta::default(),
        }
    }
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CommandStatus {
    Ok,
    Error,
}

#[derive(Debug, Serialize, Clone)]
pub struct Hint {
    #[serde(rename = "type")]
    pub kind: HintKind,
    pub text: String,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HintKind {
    Info,
    Action,
    Warn,
}

#[derive(Debug, Serialize, Default, Clone)]
pub struct ResponseMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub synced_at_unix_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documents: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graph_nodes: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graph_edges: Option<usize>,
}

pub struct CommandOutcome {
    pub data: Value,
    pub hints: Vec<Hint>,
    pub meta: ResponseMeta,
    pub started: Instant,
}

impl CommandOutcome {
    pub fn from_value<T: Serialize>(value: T) -> Result<Self> {
        Ok(Self {
            data: serde_json::to_value(value)?,
            hints: Vec::new(),
            meta: ResponseMeta::default(),
            started: Instant::now(),
        })
    }
}

pub fn parse_payload<T: DeserializeOwned>(payload: Value) -> Result<T> {
    serde_json::from_value(payload).map_err(Into::into)
}

/// Command-line depth: missing, zero or negative means the configured default.
pub fn depth_or_default(depth: Option<i64>, default: usize) -> usize {
    match depth {
        Some(depth) if depth > 0 => usize::try_from(depth).unwrap_or(default),
        _ => default,
    }
}

#[derive(Debug, Serialize)]
pub struct SyncOutput {
    #[serde(flatten)]
    pub stats: SyncStats,
    pub graph: GraphStats,
    pub graph_issues: usize,
}

#[derive(Debug, Serialize)]
pub struct ImpactOutput {
    #[serde(flatten)]
    pub report: ImpactReport,
    pub state: StateImpact,
}

#[derive(Debug, Serialize)]
pub struct SearchOutput {
    pub keywords: Vec<String>,
    pub results: Vec<RankedDocument>,
}

#[derive(Debug, Serialize)]
pub struct MissingFields {
    pub path: String,
    pub id: String,
    #[serde(rename = "type")]
    pub doc_type: String,
    pub fields: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct CheckOutput {
    pub ok: bool,
    pub failures: Vec<ParseFailure>,
    pub issues: Vec<GraphIssue>,
    pub missing_fields: Vec<MissingFields>,
}

#[derive(Debug, Serialize)]
pub struct WorkItemStatus {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    pub subtasks: Vec<Subtask>,
}

#[derive(Debug, Serialize)]
pub struct StatusOutput {
    pub active_work_items: Vec<WorkItemStatus>,
    pub pending_docs: Vec<PendingDoc>,
    pub chains: Vec<RelationChain>,
}

pub fn classify_error(message: &str) -> Vec<Hint> {
    let mut hints = Vec::new();
    let lower = message.to_lowercase();

    if message.contains("corpus root") {
        hints.push(Hint {
            kind: HintKind::Action,
            text: "Corpus directory missing; set docs_root in .docsync/config.toml or pass --root."
                .to_string(),
        });
    }

    if message.contains("project root") {
        hints.push(Hint {
            kind: HintKind::Action,
            text: "Run from the repository root or pass --root <dir>.".to_string(),
        });
    }

    if lower.contains("config error") {
        hints.push(Hint {
            kind: HintKind::Warn,
            text: "Config issue detected; fix .docsync/config.toml or remove it to use defaults."
                .to_string(),
        });
    }

    if lower.contains("json error") || message.contains("schema version") {
        hints.push(Hint {
            kind: HintKind::Action,
            text: "A JSON file could not be read; rerun `docsync sync` to rebuild .docsync/store.json, or fix the index/state file."
                .to_string(),
        });
    }

    if message.contains("Unknown relation type") {
        hints.push(Hint {
            kind: HintKind::Info,
            text: "Valid types: depends, extends, consumes, references, defines, produces, tests."
                .to_string(),
        });
    }

    hints
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_and_zero_depths_use_default() {
        assert_eq!(depth_or_default(None, 2), 2);
        assert_eq!(depth_or_default(Some(0), 2), 2);
        assert_eq!(depth_or_default(Some(-3), 5), 5);
        assert_eq!(depth_or_default(Some(4), 2), 4);
    }

    #[test]
    fn errors_carry_hints() {
        let response = CommandResponse::error("Unknown relation type: calls".to_string());
        assert!(response.is_error());
        assert_eq!(response.hints.len(), 1);
        assert_eq!(response.hints[0].kind, HintKind::Info);

        assert!(classify_error("Config error: expected value").len() == 1);
        assert!(classify_error("something unrelated").is_empty());
    }

    #[test]
    fn requests_parse_with_default_payload() {
        let request: CommandRequest = serde_json::from_str(r#"{"action":"status"}"#).unwrap();
        assert_eq!(request.action, CommandAction::Status);
        assert!(request.payload.is_object());

        let payload: ChainPayload =
            parse_payload(serde_json::json!({"node": "feat_a", "type": "depends"})).unwrap();
        assert_eq!(payload.relation.as_deref(), Some("depends"));
        assert_eq!(payload.depth, None);
    }
}
