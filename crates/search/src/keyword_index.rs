use crate::error::{Result, SearchError};
use docsync_parser::{DocType, Document, Keyword, KeywordSource};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

pub const DEFAULT_SEARCH_LIMIT: usize = 10;

/// Search hit with the evidence that ranked it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedDocument {
    pub id: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub doc_type: DocType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub match_count: usize,
    /// Matched sources, highest priority first.
    pub match_sources: Vec<KeywordSource>,
}

impl RankedDocument {
    #[must_use]
    pub fn best_source(&self) -> Option<KeywordSource> {
        self.match_sources.first().copied()
    }
}

#[derive(Debug, Clone)]
struct IndexedDocument {
    id: String,
    path: String,
    name: Option<String>,
    doc_type: DocType,
    summary: Option<String>,
}

#[derive(Debug, Clone, Copy)]
struct Posting {
    slot: usize,
    source: KeywordSource,
}

#[derive(Debug, Default)]
struct Accumulator {
    match_count: usize,
    sources: Vec<KeywordSource>,
}

/// Inverted index from keyword to the documents that carry it.
///
/// Documents keep their insertion slot, which is the final tie-breaker when ranking.
#[derive(Debug, Clone)]
pub struct KeywordIndex {
    documents: Vec<IndexedDocument>,
    by_id: HashMap<String, usize>,
    postings: BTreeMap<String, Vec<Posting>>,
    limit: usize,
}

impl Default for KeywordIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl KeywordIndex {
    #[must_use]
    pub fn new() -> Self {
        Self {
            documents: Vec::new(),
            by_id: HashMap::new(),
            postings: BTreeMap::new(),
            limit: DEFAULT_SEARCH_LIMIT,
        }
    }

    /// Index every document; a repeated id keeps the first document.
    #[must_use]
    pub fn from_documents<'a>(documents: impl IntoIterator<Item = &'a Document>) -> Self {
        let mut index = Self::new();
        for doc in documents {
            if let Err(err) = index.insert(doc) {
                log::warn!("{}: {err}", doc.path);
            }
        }
        log::debug!(
            "Keyword index: {} documents, {} keywords",
            index.len(),
            index.keyword_count()
        );
        index
    }

    pub fn with_limit(mut self, limit: usize) -> Result<Self> {
        if limit == 0 {
            return Err(SearchError::ZeroLimit);
        }
        self.limit = limit;
        Ok(self)
    }

    #[must_use]
    pub const fn limit(&self) -> usize {
        self.limit
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Distinct stored keywords.
    #[must_use]
    pub fn keyword_count(&self) -> usize {
        self.postings.len()
    }

    pub fn insert(&mut self, doc: &Document) -> Result<()> {
        if self.by_id.contains_key(&doc.id) {
            return Err(SearchError::DuplicateDocument(doc.id.clone()));
        }
        let slot = self.documents.len();
        self.documents.push(IndexedDocument {
            id: doc.id.clone(),
            path: doc.path.clone(),
            name: doc.name.clone(),
            doc_type: doc.doc_type,
            summary: doc.summary.clone(),
        });
        self.by_id.insert(doc.id.clone(), slot);
        for keyword in &doc.keywords {
            self.add_posting(slot, keyword);
        }
        Ok(())
    }

    fn add_posting(&mut self, slot: usize, keyword: &Keyword) {
        let postings = self.postings.entry(keyword.keyword.clone()).or_default();
        match postings.iter_mut().find(|p| p.slot == slot) {
            // A keyword counts once per document, under its strongest source.
            Some(existing) => {
                if keyword.source.priority() > existing.source.priority() {
                    existing.source = keyword.source;
                }
            }
            None => postings.push(Posting {
                slot,
                source: keyword.source,
            }),
        }
    }

    /// Rank documents whose stored keywords contain any of `keywords` (case-insensitive).
    ///
    /// Order: best matched source, then number of matched keywords, then insertion order.
    #[must_use]
    pub fn search<S: AsRef<str>>(&self, keywords: &[S]) -> Vec<RankedDocument> {
        let queries: Vec<String> = keywords
            .iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        if queries.is_empty() {
            return Vec::new();
        }

        let mut hits: BTreeMap<usize, Accumulator> = BTreeMap::new();
        for query in &queries {
            for (stored, postings) in &self.postings {
                if !stored.contains(query.as_str()) {
                    continue;
                }
                for posting in postings {
                    let acc = hits.entry(posting.slot).or_default();
                    acc.match_count += 1;
                    if !acc.sources.contains(&posting.source) {
                        acc.sources.push(posting.source);
                    }
                }
            }
        }

        let mut ranked: Vec<(usize, Accumulator)> = hits.into_iter().collect();
        for (_, acc) in &mut ranked {
            acc.sources.sort_by(|a, b| b.priority().cmp(&a.priority()));
        }
        // Stable sort over slot order keeps insertion order for full ties.
        ranked.sort_by(|(_, a), (_, b)| {
            let best = |acc: &Accumulator| acc.sources.first().map_or(0, |s| s.priority());
            best(b)
                .cmp(&best(a))
                .then_with(|| b.match_count.cmp(&a.match_count))
        });
        ranked.truncate(self.limit);

        ranked
            .into_iter()
            .filter_map(|(slot, acc)| {
                let doc = self.documents.get(slot)?;
                Some(RankedDocument {
                    id: doc.id.clone(),
                    path: doc.path.clone(),
                    name: doc.name.clone(),
                    doc_type: doc.doc_type,
                    summary: doc.summary.clone(),
                    match_count: acc.match_count,
                    match_sources: acc.sources,
                })
            })
            .collect()
    }
}
