use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static ANCHOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<!--\s*id:\s*([a-z][a-z0-9_]*)\s*-->").expect("anchor regex is valid")
});

/// Inline `<!-- id: name -->` marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anchor {
    pub id: String,
    /// 1-based line number inside the text the anchor was extracted from.
    pub line: usize,
}

/// Anchors found in `body` plus the primary id candidate taken from the first top-level
/// heading line that carries one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnchorScan {
    pub anchors: Vec<Anchor>,
    pub title_id: Option<String>,
}

#[must_use]
pub fn extract_anchors(body: &str) -> AnchorScan {
    let mut scan = AnchorScan::default();
    let mut in_fence = false;

    for (idx, line) in body.lines().enumerate() {
        if is_fence(line) {
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            continue;
        }

        let is_title = is_top_level_heading(line);
        for caps in ANCHOR_RE.captures_iter(line) {
            let id = caps[1].to_string();
            if is_title && scan.title_id.is_none() {
                scan.title_id = Some(id.clone());
            }
            scan.anchors.push(Anchor { id, line: idx + 1 });
        }
    }

    scan
}

/// Remove every anchor comment from a line of text.
#[must_use]
pub fn strip_anchors(text: &str) -> String {
    ANCHOR_RE.replace_all(text, "").trim().to_string()
}

pub(crate) fn is_fence(line: &str) -> bool {
    line.trim_start().starts_with("```")
}

fn is_top_level_heading(line: &str) -> bool {
    line.starts_with("# ")
}
