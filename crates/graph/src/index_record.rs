use docsync_parser::DependencyKind;
use serde::{Deserialize, Serialize};

/// One record of the project index (`{id, type, path, status, dependencies, artifacts}`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexEntry {
    pub id: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub doc_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<IndexDependency>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifacts: Option<Artifacts>,
}

impl IndexEntry {
    #[must_use]
    pub fn is_code_work(&self) -> bool {
        self.work_mode
            .as_deref()
            .is_some_and(|mode| mode.eq_ignore_ascii_case("code"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDependency {
    pub id: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl IndexDependency {
    #[must_use]
    pub fn dependency_kind(&self) -> DependencyKind {
        self.kind
            .as_deref()
            .map_or(DependencyKind::Hard, DependencyKind::from_cell)
    }
}

/// Files a code work item declares it produces.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifacts {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub design: Option<String>,
    #[serde(default)]
    pub code: Vec<String>,
    #[serde(default)]
    pub tests: Vec<String>,
}
