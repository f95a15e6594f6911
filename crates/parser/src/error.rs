use thiserror::Error;

pub type Result<T> = std::result::Result<T, ParseError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Document has no usable id: {0}")]
    MissingId(String),

    #[error("Invalid document path: {0}")]
    InvalidPath(String),
}
