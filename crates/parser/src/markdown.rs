//! Line-level markdown helpers: headings, fenced blocks, pipe tables.

use crate::anchor::{is_fence, strip_anchors};
use once_cell::sync::Lazy;
use regex::Regex;

/// `3. `, `2.1 `, `1.2.3. `; a bare number such as a year is not a section number.
static SECTION_NUMBER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d+(?:(?:\.\d+)+\.?|\.)\s+").expect("section number regex is valid")
});

/// A body line as seen by the extractors. Lines inside (and including) code fences are
/// opaque so their content can never be mistaken for headings or table rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MdLine<'a> {
    Text(&'a str),
    Fenced,
}

pub(crate) fn md_lines(body: &str) -> Vec<MdLine<'_>> {
    let mut in_fence = false;
    body.lines()
        .map(|line| {
            if is_fence(line) {
                in_fence = !in_fence;
                MdLine::Fenced
            } else if in_fence {
                MdLine::Fenced
            } else {
                MdLine::Text(line)
            }
        })
        .collect()
}

/// `(level, text)` for an ATX heading line.
pub(crate) fn heading(line: &str) -> Option<(usize, &str)> {
    let hashes = line.bytes().take_while(|b| *b == b'#').count();
    if hashes == 0 || hashes > 6 {
        return None;
    }
    let rest = &line[hashes..];
    if rest.is_empty() {
        return Some((hashes, ""));
    }
    rest.strip_prefix(' ')
        .or_else(|| rest.strip_prefix('\t'))
        .map(|text| (hashes, text.trim()))
}

/// Heading text with anchor comments and a leading section number (`2.1 `, `3. `) removed.
pub(crate) fn clean_heading(text: &str) -> String {
    let stripped = strip_anchors(text);
    match SECTION_NUMBER_RE.find(&stripped) {
        Some(number) => stripped[number.end()..].trim().to_string(),
        None => stripped,
    }
}

/// Lines of the first level-2 section whose title satisfies `matches`. The section runs until
/// the next heading of level 1 or 2.
pub(crate) fn level2_section<'a>(
    lines: &[MdLine<'a>],
    matches: impl Fn(&str) -> bool,
) -> Option<Vec<MdLine<'a>>> {
    let start = lines.iter().position(|line| match line {
        MdLine::Text(text) => heading(text).is_some_and(|(level, title)| level == 2 && matches(title)),
        MdLine::Fenced => false,
    })?;

    let section = lines[start + 1..]
        .iter()
        .copied()
        .take_while(|line| match line {
            MdLine::Text(text) => !heading(text).is_some_and(|(level, _)| level <= 2),
            MdLine::Fenced => true,
        })
        .collect();
    Some(section)
}

/// Pipe tables inside `lines`: maximal runs of consecutive unfenced lines starting with `|`.
/// Each table is returned as its rows split into cells.
pub(crate) fn pipe_tables(lines: &[MdLine<'_>]) -> Vec<Vec<Vec<String>>> {
    let mut tables = Vec::new();
    let mut current: Vec<Vec<String>> = Vec::new();

    for line in lines {
        match line {
            MdLine::Text(text) if text.trim_start().starts_with('|') => {
                current.push(split_row(text));
            }
            _ => {
                if !current.is_empty() {
                    tables.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        tables.push(current);
    }
    tables
}

fn split_row(line: &str) -> Vec<String> {
    let trimmed = line.trim();
    let inner = trimmed.strip_prefix('|').unwrap_or(trimmed);
    let inner = inner.strip_suffix('|').unwrap_or(inner);
    inner.split('|').map(|cell| cell.trim().to_string()).collect()
}

/// `|---|:---:|` style rows.
pub(crate) fn is_separator_row(cells: &[String]) -> bool {
    !cells.is_empty()
        && cells.iter().all(|cell| {
            let core = cell.trim().trim_start_matches(':').trim_end_matches(':');
            !core.is_empty() && core.chars().all(|c| c == '-')
        })
}

/// Strip inline decoration from a table cell: code spans, emphasis, link syntax.
pub(crate) fn clean_cell(cell: &str) -> String {
    let mut text = cell.trim().to_string();
    if let (Some(open), Some(mid)) = (text.find('['), text.find("](")) {
        if open < mid {
            text = text[open + 1..mid].to_string();
        }
    }
    text.chars()
        .filter(|c| !matches!(c, '`' | '*'))
        .collect::<String>()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headings_require_space_after_hashes() {
        assert_eq!(heading("## Dependencies"), Some((2, "Dependencies")));
        assert_eq!(heading("#hashtag"), None);
        assert_eq!(heading("####### too deep"), None);
    }

    #[test]
    fn clean_heading_strips_numbers_and_anchors() {
        assert_eq!(clean_heading("2.1 Data Model <!-- id: data -->"), "Data Model");
        assert_eq!(clean_heading("3. Flow"), "Flow");
        assert_eq!(clean_heading("2FA Setup"), "2FA Setup");
        assert_eq!(clean_heading("1.2.3. Retries"), "Retries");
        assert_eq!(clean_heading("2024 Roadmap"), "2024 Roadmap");
        assert_eq!(clean_heading("10 Things"), "10 Things");
    }

    #[test]
    fn section_ends_at_next_level_two_heading() {
        let body = "## Dependencies\n### Notes\n| a |\n## Other\n| b |\n";
        let lines = md_lines(body);
        let section = level2_section(&lines, |t| t.contains("Dependencies")).unwrap();
        assert_eq!(section.len(), 2);
    }

    #[test]
    fn fenced_lines_split_tables() {
        let body = "| a |\n```\n| x |\n```\n| b |\n";
        let tables = pipe_tables(&md_lines(body));
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0], vec![vec!["a".to_string()]]);
        assert_eq!(tables[1], vec![vec!["b".to_string()]]);
    }

    #[test]
    fn separator_rows_are_detected() {
        let cells = vec!["---".to_string(), ":---:".to_string()];
        assert!(is_separator_row(&cells));
        assert!(!is_separator_row(&["name".to_string()]));
    }

    #[test]
    fn clean_cell_unwraps_links_and_code() {
        assert_eq!(clean_cell("[`auth-core`](../specs/auth.md)"), "auth-core");
        assert_eq!(clean_cell("**hard**"), "hard");
    }
}
