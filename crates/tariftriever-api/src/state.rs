//! Application state for Axum handlers
//!
//! Built once at startup by [`crate::bootstrap`] and cloned into every handler.

use std::sync::Arc;

use tariftriever_catalog::{CatalogHandle, CatalogProvider};
use tariftriever_config::{ApiConfig, MissConfig};
use tariftriever_embeddings::EmbeddingService;
use tariftriever_misses::MissStatsSource;
use tariftriever_search::Resolver;

#[derive(Clone)]
pub struct AppState {
    /// The resolution engine; also owns the catalog handle
    pub resolver: Arc<Resolver>,
    /// Where `/catalog/reload` fetches a fresh catalog from
    pub catalog_provider: Arc<dyn CatalogProvider>,
    /// Backing store for `/stats/misses`
    pub miss_stats: Arc<dyn MissStatsSource>,
    /// Used by `/health` to report backend readiness
    pub embeddings: Arc<dyn EmbeddingService>,
    /// Longest query (in characters) `/resolve` accepts
    pub max_query_chars: usize,
    /// Default size of the recent-miss list
    pub stats_recent_limit: usize,
}

impl AppState {
    #[must_use]
    pub fn new(
        resolver: Arc<Resolver>,
        catalog_provider: Arc<dyn CatalogProvider>,
        miss_stats: Arc<dyn MissStatsSource>,
        embeddings: Arc<dyn EmbeddingService>,
    ) -> Self {
        Self {
            resolver,
            catalog_provider,
            miss_stats,
            embeddings,
            max_query_chars: ApiConfig::default().max_query_chars,
            stats_recent_limit: MissConfig::default().stats_recent_limit,
        }
    }

    #[must_use]
    pub const fn with_limits(mut self, max_query_chars: usize, stats_recent_limit: usize) -> Self {
        self.max_query_chars = max_query_chars;
        self.stats_recent_limit = stats_recent_limit;
        self
    }

    pub fn catalog(&self) -> &Arc<CatalogHandle> {
        self.resolver.catalog()
    }
}
