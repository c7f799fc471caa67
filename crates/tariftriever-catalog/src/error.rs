use tariftriever_common::CommonError;
use thiserror::Error;

/// Catalog errors
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The provider could not produce a catalog. Fatal at startup; on reload
    /// the previous snapshot stays active.
    #[error("Catalog unavailable from {source_name}: {message}")]
    Unavailable {
        source_name: String,
        message: String,
    },

    /// Nothing has been loaded yet
    #[error("No catalog snapshot has been loaded")]
    NotLoaded,

    /// The provider returned no usable entries
    #[error("Catalog from {source_name} contains no valid entries")]
    Empty { source_name: String },

    #[error("IO error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Catalog error: {0}")]
    Other(String),
}

impl CatalogError {
    pub fn unavailable(source_name: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Unavailable {
            source_name: source_name.into(),
            message: message.to_string(),
        }
    }
}

impl CommonError for CatalogError {
    fn io_error(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    fn parse_error(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    fn other_error(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}

tariftriever_common::impl_common_conversions!(CatalogError, with_serde);

pub type CatalogResult<T> = Result<T, CatalogError>;
