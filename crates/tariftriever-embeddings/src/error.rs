//! Error types for the tariftriever-embeddings crate

use thiserror::Error;

/// Result type alias for embedding operations
pub type EmbeddingResult<T> = Result<T, EmbeddingError>;

/// Everything here is recoverable from the resolver's point of view: the
/// semantic tier turns any of these into an empty candidate list.
#[derive(Error, Debug)]
pub enum EmbeddingError {
    /// No backend is configured
    #[error("Embedding backend unavailable: {0}")]
    Unavailable(String),

    /// Configuration and environment errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// The backend answered, but not with something usable
    #[error("Malformed embedding: {0}")]
    Malformed(String),

    /// Transport failure talking to the backend
    #[error("Network error: {0}")]
    Network(String),

    /// Backend returned a non-success status
    #[error("Embedding service returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Embedding request timed out")]
    Timeout,

    /// Generic error for other cases
    #[error("Other error: {0}")]
    Other(String),
}

impl From<reqwest::Error> for EmbeddingError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::Malformed(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<anyhow::Error> for EmbeddingError {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
