//! # Docsync Search
//!
//! Keyword lookup over parsed documents.
//!
//! Stored keywords come from titles, section headings and descriptions. A query keyword
//! matches every stored keyword that contains it, and hits are ranked by the strongest
//! matched source (title > section > description), then by match count.

mod error;
mod keyword_index;

pub use error::{Result, SearchError};
pub use keyword_index::{KeywordIndex, RankedDocument, DEFAULT_SEARCH_LIMIT};
