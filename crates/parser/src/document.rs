use crate::anchor::{extract_anchors, Anchor};
use crate::doc_type::{DocType, DocTypeRegistry, TypeContext, TypeInferenceChain};
use crate::error::{ParseError, Result};
use crate::frontmatter::{split_frontmatter, Frontmatter};
use crate::keywords::{extract_keywords, leading_blockquote, primary_heading, Keyword};
use crate::markdown::md_lines;
use crate::relations::{extract_relations, normalize_segments, DocLink, Relation, RelationType};
use crate::slug::slugify;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Work status of a document. `Completed` and `Blocked` are accepted from older inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocStatus {
    #[default]
    NotStarted,
    InProgress,
    Done,
    Completed,
    Blocked,
}

impl DocStatus {
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "not_started" | "todo" | "planned" => Some(Self::NotStarted),
            "in_progress" | "active" => Some(Self::InProgress),
            "done" => Some(Self::Done),
            "completed" | "complete" => Some(Self::Completed),
            "blocked" => Some(Self::Blocked),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::InProgress => "in_progress",
            Self::Done => "done",
            Self::Completed => "completed",
            Self::Blocked => "blocked",
        }
    }

    #[must_use]
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Done | Self::Completed)
    }
}

impl fmt::Display for DocStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed markdown document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    #[serde(rename = "type")]
    pub doc_type: DocType,
    pub path: String,
    pub name: Option<String>,
    pub summary: Option<String>,
    pub domain: Option<String>,
    pub status: DocStatus,
    #[serde(default)]
    pub frontmatter: Frontmatter,
    #[serde(default)]
    pub anchors: Vec<Anchor>,
    /// Depends, consumes and extends edges in extraction order.
    #[serde(default)]
    pub relations: Vec<Relation>,
    #[serde(default)]
    pub links: Vec<DocLink>,
    #[serde(default)]
    pub keywords: Vec<Keyword>,
}

impl Document {
    #[must_use]
    pub fn has_anchor(&self, anchor: &str) -> bool {
        self.anchors.iter().any(|a| a.id == anchor)
    }
}

/// Parses document text into [`Document`]s using a type registry and inference chain.
pub struct DocumentParser {
    registry: DocTypeRegistry,
    inference: TypeInferenceChain,
}

impl Default for DocumentParser {
    fn default() -> Self {
        Self::new(DocTypeRegistry::default())
    }
}

impl DocumentParser {
    #[must_use]
    pub fn new(registry: DocTypeRegistry) -> Self {
        Self {
            registry,
            inference: TypeInferenceChain::default(),
        }
    }

    #[must_use]
    pub fn registry(&self) -> &DocTypeRegistry {
        &self.registry
    }

    /// Parse one document. Content problems degrade fields; only a document without any usable
    /// id (or with an unusable path) is rejected.
    pub fn parse(&self, path: &str, content: &str) -> Result<Document> {
        let path = normalize_path(path)?;
        let (frontmatter, body) = split_frontmatter(content);
        let scan = extract_anchors(body);

        let id = scan
            .title_id
            .clone()
            .or_else(|| {
                frontmatter
                    .scalar("id")
                    .filter(|id| is_valid_id(id))
                    .map(str::to_string)
            })
            .or_else(|| path_fallback_id(&path))
            .ok_or_else(|| ParseError::MissingId(path.clone()))?;

        let doc_type = self.inference.infer(
            &TypeContext {
                path: &path,
                id: &id,
                frontmatter: &frontmatter,
            },
            &self.registry,
        );

        let lines = md_lines(body);
        let name = frontmatter
            .scalar("name")
            .or_else(|| frontmatter.scalar("title"))
            .map(str::to_string)
            .or_else(|| primary_heading(&lines));
        let summary = frontmatter
            .scalar("summary")
            .or_else(|| frontmatter.scalar("description"))
            .map(str::to_string)
            .or_else(|| leading_blockquote(&lines));
        let domain = frontmatter.scalar("domain").map(str::to_string);
        let status = match frontmatter.scalar("status") {
            Some(raw) => DocStatus::parse(raw).unwrap_or_else(|| {
                log::debug!("{path}: unknown status {raw:?}, using not_started");
                DocStatus::NotStarted
            }),
            None => DocStatus::NotStarted,
        };

        let extracted = extract_relations(&id, &path, body);
        let mut relations = extracted.dependencies;
        relations.extend(extracted.consumers);
        if let Some(value) = frontmatter.get("extends") {
            for parent in value.as_list() {
                let parent = slugify(parent);
                if parent.is_empty() || parent == id {
                    continue;
                }
                let relation = Relation::new(id.as_str(), parent, RelationType::Extends);
                if !relations.iter().any(|r| r.key() == relation.key()) {
                    relations.push(relation);
                }
            }
        }

        let keywords = extract_keywords(&id, body, domain.as_deref());

        Ok(Document {
            id,
            doc_type,
            path,
            name,
            summary,
            domain,
            status,
            frontmatter,
            anchors: scan.anchors,
            relations,
            links: extracted.links,
            keywords,
        })
    }
}

/// Parse with the default registry.
pub fn parse_document(path: &str, content: &str) -> Result<Document> {
    DocumentParser::default().parse(path, content)
}

/// Forward-slash path relative to the corpus root, without `.`/`..` segments.
pub fn normalize_path(path: &str) -> Result<String> {
    let unified = path.trim().replace('\\', "/");
    let relative = unified.trim_start_matches('/');
    normalize_segments(relative).ok_or_else(|| ParseError::InvalidPath(path.to_string()))
}

fn is_valid_id(id: &str) -> bool {
    let mut chars = id.chars();
    chars.next().is_some_and(|c| c.is_ascii_lowercase())
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

fn path_fallback_id(path: &str) -> Option<String> {
    let stem = path.strip_suffix(".md").unwrap_or(path);
    let slug = slugify(stem);
    let slug = slug.trim_start_matches(|c: char| c.is_ascii_digit() || c == '_');
    if slug.is_empty() {
        None
    } else {
        Some(slug.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const LOGIN: &str = "\
---
type: feature
status: in_progress
domain: identity
extends: [base-auth]
---
# Login <!-- id: feat_login -->

> Password sign in for returning users.

## Dependencies

| Dependency | Type | Notes |
|---|---|---|
| feature-spec-template | hard | layout |

See [tokens](../specs/auth.md#tokens).
";

    #[test]
    fn parses_full_document() {
        let doc = parse_document("features/login.md", LOGIN).unwrap();

        assert_eq!(doc.id, "feat_login");
        assert_eq!(doc.doc_type, DocType::Feature);
        assert_eq!(doc.path, "features/login.md");
        assert_eq!(doc.name.as_deref(), Some("Login"));
        assert_eq!(
            doc.summary.as_deref(),
            Some("Password sign in for returning users.")
        );
        assert_eq!(doc.domain.as_deref(), Some("identity"));
        assert_eq!(doc.status, DocStatus::InProgress);
        assert!(doc.has_anchor("feat_login"));

        let relations: Vec<(&str, &str, RelationType)> = doc
            .relations
            .iter()
            .map(|r| (r.source.as_str(), r.target.as_str(), r.relation))
            .collect();
        assert_eq!(
            relations,
            vec![
                ("feat_login", "feature_spec_template", RelationType::Depends),
                ("feat_login", "base_auth", RelationType::Extends),
            ]
        );
        assert_eq!(doc.links.len(), 1);
        assert_eq!(doc.links[0].path.as_deref(), Some("specs/auth.md"));
    }

    #[test]
    fn id_falls_back_to_frontmatter_then_path() {
        let doc = parse_document("specs/auth.md", "---\nid: spec_auth\n---\n# Auth\n").unwrap();
        assert_eq!(doc.id, "spec_auth");
        assert_eq!(doc.doc_type, DocType::Spec);

        let doc = parse_document("./templates/feature-spec.md", "# Feature spec\n").unwrap();
        assert_eq!(doc.id, "templates_feature_spec");
        assert_eq!(doc.path, "templates/feature-spec.md");
        assert_eq!(doc.doc_type, DocType::Template);
    }

    #[test]
    fn malformed_frontmatter_degrades_instead_of_failing() {
        let doc = parse_document("notes/x.md", "---\nbroken\n# no end").unwrap();
        assert!(doc.frontmatter.is_empty());
        assert_eq!(doc.doc_type, DocType::Undetermined);
        assert_eq!(doc.status, DocStatus::NotStarted);
        assert_eq!(doc.id, "notes_x");
        assert_eq!(doc.name.as_deref(), Some("no end"));
    }

    #[test]
    fn unusable_paths_are_rejected() {
        assert_eq!(
            parse_document("../outside.md", "# X"),
            Err(ParseError::InvalidPath("../outside.md".to_string()))
        );
        assert_eq!(
            parse_document("123.md", "# X"),
            Err(ParseError::MissingId("123.md".to_string()))
        );
    }

    #[test]
    fn legacy_statuses_are_accepted() {
        assert_eq!(DocStatus::parse("completed"), Some(DocStatus::Completed));
        assert_eq!(DocStatus::parse("Not Started"), Some(DocStatus::NotStarted));
        assert_eq!(DocStatus::parse("in-progress"), Some(DocStatus::InProgress));
        assert!(DocStatus::Completed.is_finished());
    }
}
