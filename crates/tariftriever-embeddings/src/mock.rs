//! Scriptable embedding provider for tests

use crate::traits::EmbeddingProvider;
use crate::{EmbeddingError, EmbeddingResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

/// Returns a registered vector per text (or a constant default), counts calls
/// and can fail or stall on demand.
#[derive(Clone)]
pub struct MockEmbeddingProvider {
    dimension: usize,
    vectors: HashMap<String, Vec<f32>>,
    fail: Arc<AtomicBool>,
    delay: Option<Duration>,
    calls: Arc<AtomicUsize>,
}

impl MockEmbeddingProvider {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            vectors: HashMap::new(),
            fail: Arc::new(AtomicBool::new(false)),
            delay: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Register the vector returned for `text`
    #[must_use]
    pub fn with_vector(mut self, text: &str, vector: Vec<f32>) -> Self {
        self.vectors.insert(text.to_string(), vector);
        self
    }

    #[must_use]
    pub fn with_failure(self) -> Self {
        self.fail.store(true, Ordering::SeqCst);
        self
    }

    /// Sleep before answering, to exercise timeouts
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of `embed_batch` calls so far (shared between clones)
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Shared counter handle for assertions after the provider moved into an `Arc<dyn _>`
    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbeddingProvider {
    async fn embed_batch(&self, texts: &[&str]) -> EmbeddingResult<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.fail.load(Ordering::SeqCst) {
            return Err(EmbeddingError::Network("Mock embedding failure".into()));
        }

        Ok(texts
            .iter()
            .map(|text| {
                self.vectors
                    .get(*text)
                    .cloned()
                    .unwrap_or_else(|| vec![0.0; self.dimension])
            })
            .collect())
    }

    fn embedding_dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &'static str {
        "mock-embedding-model"
    }

    async fn is_ready(&self) -> bool {
        !self.fail.load(Ordering::SeqCst)
    }
}
