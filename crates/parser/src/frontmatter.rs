use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A frontmatter value: either a single scalar or an ordered list of scalars.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FrontmatterValue {
    Scalar(String),
    List(Vec<String>),
}

impl FrontmatterValue {
    #[must_use]
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Self::Scalar(value) => Some(value.as_str()),
            Self::List(_) => None,
        }
    }

    /// List view; a scalar is treated as a one-element list.
    #[must_use]
    pub fn as_list(&self) -> Vec<&str> {
        match self {
            Self::Scalar(value) => vec![value.as_str()],
            Self::List(items) => items.iter().map(String::as_str).collect(),
        }
    }
}

/// Parsed frontmatter block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frontmatter {
    pub fields: BTreeMap<String, FrontmatterValue>,
}

impl Frontmatter {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&FrontmatterValue> {
        self.fields.get(key)
    }

    /// Non-empty scalar value for `key`.
    #[must_use]
    pub fn scalar(&self, key: &str) -> Option<&str> {
        self.get(key)
            .and_then(FrontmatterValue::as_scalar)
            .filter(|value| !value.is_empty())
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }
}

/// Split raw document text into its frontmatter block and the remaining body.
///
/// The block must start on the first line with a bare `---` and end at the next bare `---`.
/// Anything else (no opening fence, unterminated block) yields an empty frontmatter and the
/// whole text as body.
#[must_use]
pub fn split_frontmatter(text: &str) -> (Frontmatter, &str) {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let Some(first_end) = text.find('\n') else {
        return (Frontmatter::default(), text);
    };
    if text[..first_end].trim_end() != "---" {
        return (Frontmatter::default(), text);
    }

    let mut offset = first_end + 1;
    while offset <= text.len() {
        let rest = &text[offset..];
        let (line, next) = match rest.find('\n') {
            Some(pos) => (&rest[..pos], offset + pos + 1),
            None => (rest, text.len() + 1),
        };
        if line.trim_end() == "---" {
            let block = &text[first_end + 1..offset];
            let body = text.get(next..).unwrap_or("");
            return (parse_block(block), body);
        }
        if rest.is_empty() {
            break;
        }
        offset = next;
    }

    log::debug!("unterminated frontmatter block, treating document as body only");
    (Frontmatter::default(), text)
}

fn parse_block(block: &str) -> Frontmatter {
    let mut fields = BTreeMap::new();
    let mut pending_list: Option<(String, Vec<String>)> = None;

    for raw in block.lines() {
        let line = raw.trim_end();
        if line.trim().is_empty() || line.trim_start().starts_with('#') {
            continue;
        }

        if let Some(item) = line.trim_start().strip_prefix("- ") {
            if let Some((_, items)) = pending_list.as_mut() {
                items.push(unquote(item.trim()).to_string());
            }
            continue;
        }

        if let Some((key, items)) = pending_list.take() {
            fields.insert(key, list_or_empty(items));
        }

        // Nested keys (indented `key: value`) belong to a structure we do not model.
        if line.starts_with(' ') || line.starts_with('\t') {
            continue;
        }

        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        let value = value.trim();

        if value.is_empty() {
            pending_list = Some((key.to_string(), Vec::new()));
        } else if let Some(inner) = value.strip_prefix('[').and_then(|v| v.strip_suffix(']')) {
            let items = inner
                .split(',')
                .map(|item| unquote(item.trim()).to_string())
                .filter(|item| !item.is_empty())
                .collect();
            fields.insert(key.to_string(), FrontmatterValue::List(items));
        } else {
            fields.insert(
                key.to_string(),
                FrontmatterValue::Scalar(unquote(value).to_string()),
            );
        }
    }

    if let Some((key, items)) = pending_list {
        fields.insert(key, list_or_empty(items));
    }

    Frontmatter { fields }
}

fn list_or_empty(items: Vec<String>) -> FrontmatterValue {
    if items.is_empty() {
        FrontmatterValue::Scalar(String::new())
    } else {
        FrontmatterValue::List(items)
    }
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_scalars_lists_and_quotes() {
        let text = "---\ntype: feature\nname: \"Login flow\"\nowner: 'core'\ntags:\n  - auth\n  - session\n---\n# Body\n";
        let (fm, body) = split_frontmatter(text);

        assert_eq!(fm.scalar("type"), Some("feature"));
        assert_eq!(fm.scalar("name"), Some("Login flow"));
        assert_eq!(fm.scalar("owner"), Some("core"));
        assert_eq!(
            fm.get("tags"),
            Some(&FrontmatterValue::List(vec![
                "auth".to_string(),
                "session".to_string()
            ]))
        );
        assert_eq!(body, "# Body\n");
    }

    #[test]
    fn inline_lists_are_supported() {
        let (fm, _) = split_frontmatter("---\ntags: [a, \"b\"]\n---\n");
        assert_eq!(fm.get("tags").map(FrontmatterValue::as_list), Some(vec!["a", "b"]));
    }

    #[test]
    fn missing_or_unterminated_block_is_empty() {
        let (fm, body) = split_frontmatter("# Title\ntype: feature\n");
        assert!(fm.is_empty());
        assert_eq!(body, "# Title\ntype: feature\n");

        let (fm, body) = split_frontmatter("---\ntype: feature\n# Title\n");
        assert!(fm.is_empty());
        assert!(body.starts_with("---"));
    }

    #[test]
    fn empty_key_without_items_is_empty_scalar() {
        let (fm, _) = split_frontmatter("---\ndomain:\nstatus: done\n---\n");
        assert_eq!(fm.get("domain"), Some(&FrontmatterValue::Scalar(String::new())));
        assert_eq!(fm.scalar("domain"), None);
        assert_eq!(fm.scalar("status"), Some("done"));
    }

    #[test]
    fn block_closed_on_last_line_without_newline() {
        let (fm, body) = split_frontmatter("---\nid: feat_x\n---");
        assert_eq!(fm.scalar("id"), Some("feat_x"));
        assert_eq!(body, "");
    }
}
