use crate::markdown::{clean_cell, is_separator_row, level2_section, md_lines, pipe_tables, MdLine};
use crate::slug::table_target_id;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

static LINK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(!?)\[([^\]]*)\]\(([^)\s]+)(?:\s+[^)]*)?\)").expect("link regex is valid")
});

static CODE_SPAN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"`[^`]*`").expect("code span regex is valid"));

/// Edge types of the document graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationType {
    Depends,
    Extends,
    Consumes,
    References,
    Defines,
    Produces,
    Tests,
}

impl RelationType {
    pub const ALL: [Self; 7] = [
        Self::Depends,
        Self::Extends,
        Self::Consumes,
        Self::References,
        Self::Defines,
        Self::Produces,
        Self::Tests,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Depends => "depends",
            Self::Extends => "extends",
            Self::Consumes => "consumes",
            Self::References => "references",
            Self::Defines => "defines",
            Self::Produces => "produces",
            Self::Tests => "tests",
        }
    }

    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|ty| ty.as_str() == name)
    }
}

impl fmt::Display for RelationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strength of a `depends` edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyKind {
    #[default]
    Hard,
    Soft,
}

impl DependencyKind {
    /// Anything mentioning "soft" is soft; everything else, including unrecognised text, is hard.
    #[must_use]
    pub fn from_cell(cell: &str) -> Self {
        if cell.to_ascii_lowercase().contains("soft") {
            Self::Soft
        } else {
            Self::Hard
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hard => "hard",
            Self::Soft => "soft",
        }
    }
}

/// Directed typed link between two document ids (or paths).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    pub source: String,
    pub target: String,
    pub relation: RelationType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependency: Option<DependencyKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Relation {
    #[must_use]
    pub fn new(source: impl Into<String>, target: impl Into<String>, relation: RelationType) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            relation,
            dependency: None,
            description: None,
        }
    }

    #[must_use]
    pub fn with_dependency(mut self, kind: DependencyKind) -> Self {
        self.dependency = Some(kind);
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description.filter(|d| !d.is_empty());
        self
    }

    /// Identity of an edge: `(source, target, type)`.
    #[must_use]
    pub fn key(&self) -> (&str, &str, RelationType) {
        (&self.source, &self.target, self.relation)
    }
}

/// Markdown link to another file of the corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocLink {
    pub text: String,
    /// Link target as written (without the anchor).
    pub raw: String,
    /// Target normalised against the linking document's directory. `None` when the link
    /// escapes the corpus root.
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor: Option<String>,
    pub line: usize,
}

/// Relation-bearing constructs found in one document body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedRelations {
    pub dependencies: Vec<Relation>,
    pub consumers: Vec<Relation>,
    pub links: Vec<DocLink>,
}

/// Dependencies and Consumers tables plus markdown links of `body`.
#[must_use]
pub fn extract_relations(doc_id: &str, doc_path: &str, body: &str) -> ExtractedRelations {
    let lines = md_lines(body);
    let mut seen = HashSet::new();

    let dependencies: Vec<Relation> = table_rows(&lines, "dependencies", "dependency")
        .into_iter()
        .filter_map(|row| {
            let name = row.first().map(|cell| clean_cell(cell))?;
            let target = table_target_id(&name)?;
            let kind = row
                .get(1)
                .map_or(DependencyKind::Hard, |cell| DependencyKind::from_cell(cell));
            let description = row.get(2).map(|cell| clean_cell(cell));
            Some(
                Relation::new(doc_id, target, RelationType::Depends)
                    .with_dependency(kind)
                    .with_description(description),
            )
        })
        .filter(|rel| seen.insert((rel.source.clone(), rel.target.clone(), rel.relation)))
        .collect();

    let consumers: Vec<Relation> = table_rows(&lines, "consumers", "consumer")
        .into_iter()
        .filter_map(|row| {
            let name = row.first().map(|cell| clean_cell(cell))?;
            let consumer = table_target_id(&name)?;
            let description = row.get(1).map(|cell| clean_cell(cell));
            Some(Relation::new(consumer, doc_id, RelationType::Consumes).with_description(description))
        })
        .filter(|rel| seen.insert((rel.source.clone(), rel.target.clone(), rel.relation)))
        .collect();

    ExtractedRelations {
        dependencies,
        consumers,
        links: extract_links(doc_path, &lines),
    }
}

/// Data rows of the first table in the `section_word` section whose header mentions
/// `header_word`. Header and separator rows are skipped, as are rows without a first cell.
fn table_rows(lines: &[MdLine<'_>], section_word: &str, header_word: &str) -> Vec<Vec<String>> {
    let Some(section) = level2_section(lines, |title| {
        title.to_ascii_lowercase().contains(section_word)
    }) else {
        return Vec::new();
    };

    let Some(table) = pipe_tables(&section).into_iter().find(|rows| {
        rows.first().is_some_and(|header| {
            header
                .iter()
                .any(|cell| cell.to_ascii_lowercase().contains(header_word))
        })
    }) else {
        return Vec::new();
    };

    table
        .into_iter()
        .skip(1)
        .filter(|row| !is_separator_row(row))
        .filter(|row| row.first().is_some_and(|cell| !cell.is_empty()))
        .collect()
}

fn extract_links(doc_path: &str, lines: &[MdLine<'_>]) -> Vec<DocLink> {
    let mut links = Vec::new();

    for (idx, line) in lines.iter().enumerate() {
        let MdLine::Text(text) = line else {
            continue;
        };
        let text = CODE_SPAN_RE.replace_all(text, "");
        for caps in LINK_RE.captures_iter(&text) {
            if !caps[1].is_empty() {
                continue;
            }
            let target = &caps[3];
            if is_excluded_target(target) {
                continue;
            }
            let (raw, anchor) = match target.split_once('#') {
                Some((path, anchor)) => (path, Some(anchor.to_string()).filter(|a| !a.is_empty())),
                None => (target, None),
            };
            links.push(DocLink {
                text: caps[2].trim().to_string(),
                raw: raw.to_string(),
                path: resolve_link(doc_path, raw),
                anchor,
                line: idx + 1,
            });
        }
    }

    links
}

fn is_excluded_target(target: &str) -> bool {
    let lower = target.to_ascii_lowercase();
    lower.starts_with("http://")
        || lower.starts_with("https://")
        || lower.starts_with("mailto:")
        || target.starts_with('#')
        || target.contains('{')
        || target.contains('}')
        || target.contains('<')
        || target.contains('>')
}

/// Resolve `link` relative to the directory of `doc_path`. A leading `/` anchors the link at
/// the corpus root. Returns `None` if the result would escape the root.
#[must_use]
pub fn resolve_link(doc_path: &str, link: &str) -> Option<String> {
    let joined = if let Some(absolute) = link.strip_prefix('/') {
        absolute.to_string()
    } else {
        match doc_path.rsplit_once('/') {
            Some((dir, _)) => format!("{dir}/{link}"),
            None => link.to_string(),
        }
    };
    normalize_segments(&joined)
}

/// Collapse `.` and `..` segments of a forward-slash path.
pub(crate) fn normalize_segments(path: &str) -> Option<String> {
    let mut parts: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop()?;
            }
            other => parts.push(other),
        }
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const FEATURE: &str = "\
# Login <!-- id: feat_login -->

## Dependencies

Some prose.

| Dependency | Type | Notes |
|------------|------|-------|
| feature-spec-template | hard | layout |
| auth | soft | tokens |
| `session-store` | Hard |  |

## Consumers

| Consumer | Usage |
|---|---|
| checkout-flow | needs login |

## Notes
| Dependency | Type |
|---|---|
| ignored-dep | hard |
";

    #[test]
    fn dependency_rows_become_depends_edges() {
        let rel = extract_relations("feat_login", "features/login.md", FEATURE);
        let deps: Vec<(&str, &str, Option<DependencyKind>)> = rel
            .dependencies
            .iter()
            .map(|r| (r.source.as_str(), r.target.as_str(), r.dependency))
            .collect();

        assert_eq!(
            deps,
            vec![
                ("feat_login", "feature_spec_template", Some(DependencyKind::Hard)),
                ("feat_login", "spec_auth", Some(DependencyKind::Soft)),
                ("feat_login", "session_store", Some(DependencyKind::Hard)),
            ]
        );
        assert_eq!(rel.dependencies[0].description.as_deref(), Some("layout"));
        assert_eq!(rel.dependencies[2].description, None);
    }

    #[test]
    fn consumer_edges_point_at_the_document() {
        let rel = extract_relations("feat_login", "features/login.md", FEATURE);
        assert_eq!(rel.consumers.len(), 1);
        assert_eq!(rel.consumers[0].source, "checkout_flow");
        assert_eq!(rel.consumers[0].target, "feat_login");
        assert_eq!(rel.consumers[0].relation, RelationType::Consumes);
    }

    #[test]
    fn fenced_tables_are_never_parsed() {
        let body = "## Dependencies\n```\n| Dependency | Type |\n|---|---|\n| fake-dep | hard |\n```\n";
        let rel = extract_relations("x", "x.md", body);
        assert!(rel.dependencies.is_empty());
    }

    #[test]
    fn only_the_first_dependency_table_is_used() {
        let body = "## Dependencies\n| Name | Kind |\n|---|---|\n| not-this | hard |\n\n| Dependency | Type |\n|---|---|\n| this-one | hard |\n\n| Dependency | Type |\n|---|---|\n| not-second | hard |\n";
        let rel = extract_relations("x", "x.md", body);
        let targets: Vec<&str> = rel.dependencies.iter().map(|r| r.target.as_str()).collect();
        assert_eq!(targets, vec!["this_one"]);
    }

    #[test]
    fn duplicate_rows_are_collapsed() {
        let body = "## Dependencies\n| Dependency | Type |\n|---|---|\n| auth | hard |\n| auth | soft |\n";
        let rel = extract_relations("x", "x.md", body);
        assert_eq!(rel.dependencies.len(), 1);
        assert_eq!(rel.dependencies[0].dependency, Some(DependencyKind::Hard));
    }

    #[test]
    fn links_skip_external_anchor_only_and_placeholders() {
        let body = "\
See [auth](../specs/auth.md#tokens), [site](https://example.com), [top](#intro),
[tmpl]({{path}}), ![img](diagram.png), `[code](not-a-link.md)` and [flow](/flows/checkout.md).
";
        let rel = extract_relations("feat_login", "features/login.md", body);
        let got: Vec<(Option<&str>, Option<&str>)> = rel
            .links
            .iter()
            .map(|l| (l.path.as_deref(), l.anchor.as_deref()))
            .collect();
        assert_eq!(
            got,
            vec![
                (Some("specs/auth.md"), Some("tokens")),
                (Some("flows/checkout.md"), None),
            ]
        );
    }

    #[test]
    fn links_escaping_the_root_do_not_resolve() {
        assert_eq!(resolve_link("a.md", "../../x.md"), None);
        assert_eq!(resolve_link("a/b.md", "./c.md").as_deref(), Some("a/c.md"));
    }
}
