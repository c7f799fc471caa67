//! Trait abstractions for embedding generation

use crate::EmbeddingResult;
use async_trait::async_trait;
use serde::Serialize;

/// Trait for embedding generation providers
///
/// Lets the semantic tier run against any backend (HTTP service, disabled,
/// test doubles) without touching resolution logic.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate embeddings for a batch of texts, one vector per input
    async fn embed_batch(&self, texts: &[&str]) -> EmbeddingResult<Vec<Vec<f32>>>;

    /// Dimensionality of the vectors this provider returns
    fn embedding_dimension(&self) -> usize;

    /// Name of the embedding model
    fn model_name(&self) -> &str;

    /// Whether the provider can currently serve requests
    async fn is_ready(&self) -> bool;
}

/// Validating front for a provider used by the resolver
#[async_trait]
pub trait EmbeddingService: Send + Sync {
    /// Embed a single query text.
    ///
    /// The returned vector has the provider's dimension and only finite values.
    async fn embed_query(&self, text: &str) -> EmbeddingResult<Vec<f32>>;

    /// Get the embedding provider being used
    fn provider(&self) -> &dyn EmbeddingProvider;

    /// Get service statistics
    async fn get_stats(&self) -> EmbeddingStats;
}

/// Statistics about embedding generation
#[derive(Debug, Clone, Default, Serialize)]
pub struct EmbeddingStats {
    pub total_requests: usize,
    pub failed_requests: usize,
    /// Average latency of successful requests in milliseconds
    pub avg_latency_ms: f64,
    pub model_name: String,
    pub embedding_dimension: usize,
}
