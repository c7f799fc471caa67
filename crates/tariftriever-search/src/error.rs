use tariftriever_catalog::CatalogError;
use tariftriever_common::CorrelationId;
use thiserror::Error;

/// Resolution errors with correlation ID support.
///
/// Tier failures never surface here; a resolution only fails when there is
/// no catalog to resolve against.
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Catalog unavailable (correlation: {correlation_id}): {source}")]
    CatalogUnavailable {
        correlation_id: CorrelationId,
        #[source]
        source: CatalogError,
    },
}

impl SearchError {
    pub const fn correlation_id(&self) -> &CorrelationId {
        match self {
            Self::CatalogUnavailable { correlation_id, .. } => correlation_id,
        }
    }
}

/// Result type for resolver operations
pub type ResolveResult<T> = std::result::Result<T, SearchError>;
