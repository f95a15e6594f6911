use crate::error::Result;
use crate::scanner::CorpusScanner;
use crate::store::{DocStore, ParseFailure};
use docsync_parser::{DocumentParser, ParseError};
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Instant;

/// Counters reported by a full resync.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncStats {
    pub files: usize,
    pub documents: usize,
    pub failures: usize,
    pub relations: usize,
    pub links: usize,
    pub keywords: usize,
    /// Documents per type name.
    pub by_type: BTreeMap<String, usize>,
    pub duration_ms: u64,
}

/// Scan the corpus, parse every file and replace the store contents.
///
/// A file that fails to parse is recorded as a [`ParseFailure`] and never aborts the run;
/// only an unreadable corpus root or a failing store write is an error.
pub async fn sync_corpus(
    scanner: &CorpusScanner,
    parser: &DocumentParser,
    store: &mut DocStore,
) -> Result<SyncStats> {
    let start = Instant::now();
    log::info!("Syncing corpus at {}", scanner.root().display());

    let (files, mut failures) = scanner.read_all().await?;
    let mut stats = SyncStats {
        files: files.len() + failures.len(),
        ..SyncStats::default()
    };

    let mut documents = Vec::with_capacity(files.len());
    for file in files {
        match parser.parse(&file.path, &file.content) {
            Ok(doc) => {
                log::debug!("{}: {} ({})", doc.path, doc.id, doc.doc_type);
                stats.relations += doc.relations.len();
                stats.links += doc.links.len();
                stats.keywords += doc.keywords.len();
                *stats.by_type.entry(doc.doc_type.to_string()).or_insert(0) += 1;
                documents.push(doc);
            }
            Err(err) => {
                log::warn!("Skipping {}: {err}", file.path);
                failures.push(ParseFailure {
                    path: file.path,
                    reason: failure_reason(&err),
                });
            }
        }
    }
    failures.sort_by(|a, b| a.path.cmp(&b.path));

    stats.documents = documents.len();
    stats.failures = failures.len();

    let root = scanner.root().to_string_lossy().into_owned();
    store.replace_all(&root, documents, failures).await?;

    stats.duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
    log::info!(
        "Sync completed: {} documents, {} failures, {} keywords",
        stats.documents,
        stats.failures,
        stats.keywords
    );
    Ok(stats)
}

fn failure_reason(err: &ParseError) -> String {
    match err {
        ParseError::MissingId(_) => "no usable id (anchor, frontmatter or path)".to_string(),
        ParseError::InvalidPath(_) => "path escapes the corpus root".to_string(),
    }
}
