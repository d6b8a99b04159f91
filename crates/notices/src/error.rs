//! Notice error types

use thiserror::Error;

/// Errors from fetching, parsing or caching notices
#[derive(Debug, Error)]
pub enum SourceFetchError {
    /// HTTP request failed or returned a non-success status
    #[error("HTTP error from {source_id}: {message}")]
    Http { source_id: String, message: String },

    /// Source did not answer within its deadline
    #[error("Source {source_id} timed out after {secs}s")]
    Timeout { source_id: String, secs: u64 },

    /// Feed body could not be parsed
    #[error("Failed to parse feed from {source_id}: {message}")]
    Parse { source_id: String, message: String },

    /// Cache file IO failed
    #[error("Cache IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Cache entry could not be serialized
    #[error("Cache serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type SourceResult<T> = Result<T, SourceFetchError>;
