use crate::anchor::strip_anchors;
use crate::markdown::{clean_heading, heading, md_lines, MdLine};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Where a keyword was found. Ordered by search priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeywordSource {
    Description,
    Section,
    Title,
}

impl KeywordSource {
    /// title=3, section=2, description=1.
    #[must_use]
    pub const fn priority(self) -> u8 {
        match self {
            Self::Title => 3,
            Self::Section => 2,
            Self::Description => 1,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Section => "section",
            Self::Description => "description",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyword {
    pub doc_id: String,
    pub keyword: String,
    pub source: KeywordSource,
}

const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "all", "also", "am", "an", "and", "any", "are", "as",
    "at", "be", "because", "been", "before", "being", "below", "between", "both", "but", "by",
    "can", "could", "did", "do", "does", "doing", "down", "during", "each", "few", "for", "from",
    "further", "had", "has", "have", "having", "he", "her", "here", "hers", "him", "his", "how",
    "if", "in", "into", "is", "it", "its", "itself", "just", "me", "more", "most", "my", "no",
    "nor", "not", "now", "of", "off", "on", "once", "only", "or", "other", "our", "ours", "out",
    "over", "own", "same", "she", "should", "so", "some", "such", "than", "that", "the", "their",
    "them", "then", "there", "these", "they", "this", "those", "through", "to", "too", "under",
    "until", "up", "very", "was", "we", "were", "what", "when", "where", "which", "while", "who",
    "whom", "why", "will", "with", "would", "you", "your", "yours",
];

#[must_use]
pub fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.binary_search(&word).is_ok()
}

/// Lower-cased words of length >= 2 that are neither stop words nor pure numbers.
#[must_use]
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .map(str::to_lowercase)
        .filter(|word| word.chars().count() >= 2)
        .filter(|word| !word.chars().all(|c| c.is_ascii_digit()))
        .filter(|word| !is_stop_word(word))
        .collect()
}

/// Keyword collector: one entry per keyword, in first-seen order, carrying the
/// highest-priority source it was found under.
#[derive(Debug, Default)]
struct KeywordSet {
    entries: Vec<(String, KeywordSource)>,
    positions: HashMap<String, usize>,
}

impl KeywordSet {
    fn add_text(&mut self, text: &str, source: KeywordSource) {
        for word in tokenize(text) {
            match self.positions.get(&word) {
                Some(&pos) => {
                    let existing = &mut self.entries[pos].1;
                    if source.priority() > existing.priority() {
                        *existing = source;
                    }
                }
                None => {
                    self.positions.insert(word.clone(), self.entries.len());
                    self.entries.push((word, source));
                }
            }
        }
    }
}

/// Keywords of a document: primary heading (title), `##`/`###` headings (section), leading
/// blockquote lines and the `domain` value (description).
#[must_use]
pub fn extract_keywords(doc_id: &str, body: &str, domain: Option<&str>) -> Vec<Keyword> {
    let lines = md_lines(body);
    let mut set = KeywordSet::default();

    if let Some(title) = primary_heading(&lines) {
        set.add_text(&title, KeywordSource::Title);
    }

    for line in &lines {
        if let MdLine::Text(text) = line {
            if let Some((level, title)) = heading(text) {
                if level == 2 || level == 3 {
                    set.add_text(&clean_heading(title), KeywordSource::Section);
                }
            }
        }
    }

    if let Some(description) = leading_blockquote(&lines) {
        set.add_text(&description, KeywordSource::Description);
    }
    if let Some(domain) = domain {
        set.add_text(domain, KeywordSource::Description);
    }

    set.entries
        .into_iter()
        .map(|(keyword, source)| Keyword {
            doc_id: doc_id.to_string(),
            keyword,
            source,
        })
        .collect()
}

/// Text of the first level-1 heading, anchors removed.
pub(crate) fn primary_heading(lines: &[MdLine<'_>]) -> Option<String> {
    lines.iter().find_map(|line| match line {
        MdLine::Text(text) => heading(text)
            .filter(|(level, _)| *level == 1)
            .map(|(_, title)| strip_anchors(title))
            .filter(|title| !title.is_empty()),
        MdLine::Fenced => None,
    })
}

/// Consecutive `>` lines that open the document (after the primary heading and blank lines).
pub(crate) fn leading_blockquote(lines: &[MdLine<'_>]) -> Option<String> {
    let mut iter = lines.iter().peekable();

    while let Some(MdLine::Text(text)) = iter.peek() {
        let trimmed = text.trim();
        let skip = trimmed.is_empty() || heading(trimmed).is_some_and(|(level, _)| level == 1);
        if !skip {
            break;
        }
        iter.next();
    }

    let mut parts = Vec::new();
    while let Some(MdLine::Text(text)) = iter.peek() {
        let Some(quote) = text.trim_start().strip_prefix('>') else {
            break;
        };
        let quote = quote.trim();
        if !quote.is_empty() {
            parts.push(quote.to_string());
        }
        iter.next();
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" "))
    }
}

/// Convenience for callers holding the full document text.
#[must_use]
pub fn extract_keywords_from_text(doc_id: &str, text: &str) -> Vec<Keyword> {
    let (frontmatter, body) = crate::frontmatter::split_frontmatter(text);
    extract_keywords(doc_id, body, frontmatter.scalar("domain"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn words(keywords: &[Keyword]) -> Vec<(&str, KeywordSource)> {
        keywords
            .iter()
            .map(|k| (k.keyword.as_str(), k.source))
            .collect()
    }

    #[test]
    fn stop_word_list_is_sorted_for_binary_search() {
        let mut sorted = STOP_WORDS.to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, STOP_WORDS.to_vec());
    }

    #[test]
    fn title_words_without_stop_words() {
        let keywords = extract_keywords("doc", "# The Quick Brown Fox\n", None);
        assert_eq!(
            words(&keywords),
            vec![
                ("quick", KeywordSource::Title),
                ("brown", KeywordSource::Title),
                ("fox", KeywordSource::Title),
            ]
        );
    }

    #[test]
    fn sections_descriptions_and_domain_are_tagged() {
        let body = "\
# Login <!-- id: feat_login -->

> Password based sign in.

## 1. Session Tokens <!-- id: tokens -->
### Error handling
#### Deep heading
";
        let keywords = extract_keywords("feat_login", body, Some("identity"));
        assert_eq!(
            words(&keywords),
            vec![
                ("login", KeywordSource::Title),
                ("session", KeywordSource::Section),
                ("tokens", KeywordSource::Section),
                ("error", KeywordSource::Section),
                ("handling", KeywordSource::Section),
                ("password", KeywordSource::Description),
                ("based", KeywordSource::Description),
                ("sign", KeywordSource::Description),
                ("identity", KeywordSource::Description),
            ]
        );
        assert!(keywords.iter().all(|k| k.doc_id == "feat_login"));
    }

    #[test]
    fn duplicate_keeps_highest_priority_source() {
        let body = "# Checkout\n\n> Checkout flow for carts.\n\n## Flow\n";
        let keywords = extract_keywords_from_text("x", &format!("---\ndomain: flow\n---\n{body}"));
        assert_eq!(
            words(&keywords),
            vec![
                ("checkout", KeywordSource::Title),
                ("flow", KeywordSource::Section),
                ("carts", KeywordSource::Description),
            ]
        );
    }

    #[test]
    fn fenced_headings_are_ignored() {
        let keywords = extract_keywords("x", "```\n# Hidden Title\n```\n", None);
        assert!(keywords.is_empty());
    }
}
