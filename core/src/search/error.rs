use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("search query cannot be empty")]
    EmptyQuery,
    #[error("result limit must be at least 1")]
    InvalidLimit,
    #[error("search provider unreachable: {0}")]
    Unreachable(String),
    #[error("search provider answered with status {status}")]
    Status { status: u16 },
    #[error("search provider returned malformed data: {0}")]
    Malformed(String),
}
