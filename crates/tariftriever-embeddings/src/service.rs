//! Default [`EmbeddingService`] implementation

use crate::traits::{EmbeddingProvider, EmbeddingService, EmbeddingStats};
use crate::{EmbeddingError, EmbeddingResult};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;

/// Wraps a provider, checks every vector it returns and keeps usage stats
pub struct DefaultEmbeddingService {
    provider: Arc<dyn EmbeddingProvider>,
    stats: Arc<RwLock<EmbeddingStats>>,
}

impl DefaultEmbeddingService {
    pub fn with_provider(provider: Arc<dyn EmbeddingProvider>) -> Self {
        let stats = Arc::new(RwLock::new(EmbeddingStats {
            model_name: provider.model_name().to_string(),
            embedding_dimension: provider.embedding_dimension(),
            ..Default::default()
        }));

        Self { provider, stats }
    }

    fn validate(&self, vector: &[f32]) -> EmbeddingResult<()> {
        let expected = self.provider.embedding_dimension();
        if vector.len() != expected {
            return Err(EmbeddingError::Malformed(format!(
                "expected dimension {expected}, got {}",
                vector.len()
            )));
        }
        if !vector.iter().all(|v| v.is_finite()) {
            return Err(EmbeddingError::Malformed(
                "vector contains non-finite values".to_string(),
            ));
        }
        Ok(())
    }

    async fn record(&self, started: Instant, ok: bool) {
        let elapsed = started.elapsed().as_secs_f64() * 1000.0;
        let mut stats = self.stats.write().await;
        stats.total_requests = stats.total_requests.saturating_add(1);
        if ok {
            let successes = stats.total_requests.saturating_sub(stats.failed_requests) as f64;
            let prev_avg = stats.avg_latency_ms;
            stats.avg_latency_ms = (prev_avg * (successes - 1.0) + elapsed) / successes;
        } else {
            stats.failed_requests = stats.failed_requests.saturating_add(1);
        }
    }
}

#[async_trait]
impl EmbeddingService for DefaultEmbeddingService {
    async fn embed_query(&self, text: &str) -> EmbeddingResult<Vec<f32>> {
        let started = Instant::now();

        let result = async {
            let vector = self
                .provider
                .embed_batch(&[text])
                .await?
                .into_iter()
                .next()
                .ok_or_else(|| EmbeddingError::Malformed("empty response".to_string()))?;
            self.validate(&vector)?;
            Ok(vector)
        }
        .await;

        self.record(started, result.is_ok()).await;
        result
    }

    fn provider(&self) -> &dyn EmbeddingProvider {
        self.provider.as_ref()
    }

    async fn get_stats(&self) -> EmbeddingStats {
        self.stats.read().await.clone()
    }
}
