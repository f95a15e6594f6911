use thiserror::Error;

pub type Result<T> = std::result::Result<T, SearchError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("Document already indexed: {0}")]
    DuplicateDocument(String),

    #[error("Search limit must be positive")]
    ZeroLimit,
}
