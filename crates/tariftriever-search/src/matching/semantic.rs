//! Embedding similarity matching

use crate::{Method, NormalizedQuery, SearchResult, rank};
use std::sync::Arc;
use std::time::Duration;
use tariftriever_catalog::Catalog;
use tariftriever_config::ResolverConfig;
use tariftriever_embeddings::{EmbeddingService, cosine_similarity};

/// Ranks catalog entries by cosine similarity to the embedded query.
///
/// Any embedding failure, including the time box expiring, degrades to an
/// empty result.
pub struct SemanticMatcher {
    embeddings: Arc<dyn EmbeddingService>,
    threshold: f32,
    top_k: usize,
    timeout: Duration,
}

impl SemanticMatcher {
    pub fn new(
        embeddings: Arc<dyn EmbeddingService>,
        threshold: f32,
        top_k: usize,
        timeout: Duration,
    ) -> Self {
        Self {
            embeddings,
            threshold,
            top_k,
            timeout,
        }
    }

    pub fn from_config(embeddings: Arc<dyn EmbeddingService>, config: &ResolverConfig) -> Self {
        Self::new(
            embeddings,
            config.semantic_threshold,
            config.semantic_top_k,
            config.semantic_timeout(),
        )
    }

    pub async fn match_semantic(
        &self,
        query: &NormalizedQuery,
        catalog: &Catalog,
    ) -> Vec<SearchResult> {
        if query.is_empty() {
            return Vec::new();
        }

        let embedding = match tokio::time::timeout(
            self.timeout,
            self.embeddings.embed_query(&query.text),
        )
        .await
        {
            Ok(Ok(embedding)) => embedding,
            Ok(Err(e)) => {
                tracing::warn!(error_kind = "EmbeddingUnavailable", error = %e, "Semantic tier skipped");
                metrics::counter!("tariftriever_embedding_failures_total").increment(1);
                return Vec::new();
            }
            Err(_) => {
                tracing::warn!(
                    error_kind = "EmbeddingUnavailable",
                    timeout_ms = self.timeout.as_millis(),
                    "Semantic tier timed out"
                );
                metrics::counter!("tariftriever_embedding_failures_total").increment(1);
                return Vec::new();
            }
        };

        let mut results: Vec<SearchResult> = catalog
            .iter()
            .filter_map(|(position, entry)| {
                let vector = entry.embedding.as_deref()?;
                let similarity = cosine_similarity(&embedding, vector)?;
                (similarity >= self.threshold).then(|| {
                    SearchResult::new(Arc::clone(entry), similarity, Method::Semantic, position)
                })
            })
            .collect();

        rank(&mut results);
        results.truncate(self.top_k);
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Normalizer;
    use crate::test_utils::{RED_APPLE, fixture_catalog, fixture_embeddings};
    use tariftriever_catalog::CatalogEntry;
    use tariftriever_common::Language;
    use tariftriever_embeddings::{DefaultEmbeddingService, MockEmbeddingProvider};

    fn query(raw: &str) -> NormalizedQuery {
        Normalizer::default().normalize(raw, &Language::En)
    }

    fn service(provider: MockEmbeddingProvider) -> Arc<dyn EmbeddingService> {
        Arc::new(DefaultEmbeddingService::with_provider(Arc::new(provider)))
    }

    fn matcher(provider: MockEmbeddingProvider) -> SemanticMatcher {
        SemanticMatcher::from_config(service(provider), &ResolverConfig::default())
    }

    #[tokio::test]
    async fn test_similar_entries_above_threshold() {
        let catalog = fixture_catalog();
        let results = matcher(fixture_embeddings())
            .match_semantic(&query(RED_APPLE), &catalog)
            .await;

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].code(), "0808");
        assert_eq!(results[0].method, Method::Semantic);
        assert!((results[0].score - 0.7).abs() < 0.01);
    }

    #[tokio::test]
    async fn test_unknown_query_vector_matches_nothing() {
        let catalog = fixture_catalog();
        let results = matcher(fixture_embeddings())
            .match_semantic(&query("xyzzyqwerty"), &catalog)
            .await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_entries_without_matching_vectors_are_skipped() {
        let (catalog, _) = Catalog::from_entries(
            vec![
                CatalogEntry::new("0808", "Яблоки").with_embedding(vec![1.0, 0.0, 0.0]),
                CatalogEntry::new("0809", "Абрикосы"),
            ],
            "test",
            1,
        );
        let provider = MockEmbeddingProvider::new(3).with_vector("apricot", vec![1.0, 0.0, 0.0]);
        let results = matcher(provider).match_semantic(&query("apricot"), &catalog).await;

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].code(), "0808");
    }

    #[tokio::test]
    async fn test_top_k_cap() {
        let catalog = fixture_catalog();
        let provider = MockEmbeddingProvider::new(3).with_vector("fruit", vec![1.0, 0.1, 0.0]);
        let matcher = SemanticMatcher::new(service(provider), 0.0, 1, Duration::from_secs(1));

        let results = matcher.match_semantic(&query("fruit"), &catalog).await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].code(), "0808");
    }

    #[tokio::test]
    async fn test_provider_failure_degrades_to_empty() {
        let catalog = fixture_catalog();
        let results = matcher(fixture_embeddings().with_failure())
            .match_semantic(&query(RED_APPLE), &catalog)
            .await;
        assert!(results.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_degrades_to_empty() {
        let catalog = fixture_catalog();
        let provider = fixture_embeddings().with_delay(Duration::from_secs(30));
        let matcher = SemanticMatcher::new(service(provider), 0.55, 10, Duration::from_millis(50));

        let results = matcher.match_semantic(&query(RED_APPLE), &catalog).await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_empty_query_skips_embedding() {
        let catalog = fixture_catalog();
        let provider = fixture_embeddings();
        let calls = provider.call_counter();

        let results = matcher(provider).match_semantic(&query("   "), &catalog).await;
        assert!(results.is_empty());
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    }
}
