//! Shared fixtures for resolver tests

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use crate::Resolver;
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use tariftriever_catalog::{Catalog, CatalogEntry, CatalogHandle};
use tariftriever_config::ResolverConfig;
use tariftriever_embeddings::{DefaultEmbeddingService, MockEmbeddingProvider};
use tariftriever_misses::{InMemoryMissSink, MissRecorder};

/// Query whose embedding is about 0.7 similar to heading 0808 and unrelated
/// to everything else
pub const RED_APPLE: &str = "red apple";

pub const FIXTURE_DIMENSION: usize = 3;

/// A small catalog with a code family (02xx), short and long descriptions
/// and a few embedded entries.
pub fn fixture_entries() -> Vec<CatalogEntry> {
    vec![
        CatalogEntry::new("0201", "Мясо крупного рогатого скота, свежее или охлажденное"),
        CatalogEntry::new(
            "0206",
            "Пищевые субпродукты крупного рогатого скота, свиней, овец, коз",
        ),
        CatalogEntry::new(
            "020610",
            "Субпродукты пищевые крупного рогатого скота, свежие или охлажденные",
        ),
        CatalogEntry::new(
            "02061000",
            "Субпродукты пищевые крупного рогатого скота для фармацевтического производства",
        ),
        CatalogEntry::new("0808", "Яблоки, груши и айва, свежие").with_embedding(vec![1.0, 0.0, 0.0]),
        CatalogEntry::new("080810", "Яблоки свежие").with_embedding(vec![0.6, -0.8, 0.0]),
        CatalogEntry::new(
            "8703",
            "Автомобили легковые и прочие моторные транспортные средства",
        )
        .with_embedding(vec![0.0, 0.0, 1.0]),
        CatalogEntry::new(
            "0902",
            "Чай зеленый (неферментированный) в первичных упаковках нетто-массой не более 3 кг, \
             с ароматическими добавками или без них, черный чай",
        ),
        CatalogEntry::new("090210", "Чай зеленый"),
    ]
}

pub fn fixture_catalog() -> Catalog {
    Catalog::from_entries(fixture_entries(), "fixture", 1).0
}

/// Mock provider that knows only [`RED_APPLE`]; every other text embeds to
/// the zero vector and matches nothing.
pub fn fixture_embeddings() -> MockEmbeddingProvider {
    MockEmbeddingProvider::new(FIXTURE_DIMENSION).with_vector(RED_APPLE, vec![0.7, 0.714, 0.0])
}

/// A resolver wired to the fixture catalog, a mock embedding backend and an
/// in-memory miss sink. Must be built inside a Tokio runtime.
pub struct TestHarness {
    pub resolver: Arc<Resolver>,
    pub catalog: Arc<CatalogHandle>,
    pub misses: InMemoryMissSink,
    /// Number of embedding calls the semantic tier has made
    pub embedding_calls: Arc<AtomicUsize>,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_embeddings(ResolverConfig::default(), fixture_embeddings())
    }

    pub fn with_embeddings(config: ResolverConfig, provider: MockEmbeddingProvider) -> Self {
        let catalog = CatalogHandle::from_entries(fixture_entries(), "fixture")
            .expect("fixture catalog is valid");
        Self::build(config, Arc::new(catalog), provider)
    }

    /// Harness whose catalog was never loaded
    pub fn unloaded() -> Self {
        Self::build(
            ResolverConfig::default(),
            Arc::new(CatalogHandle::new()),
            fixture_embeddings(),
        )
    }

    fn build(
        config: ResolverConfig,
        catalog: Arc<CatalogHandle>,
        provider: MockEmbeddingProvider,
    ) -> Self {
        let embedding_calls = provider.call_counter();
        let embeddings = Arc::new(DefaultEmbeddingService::with_provider(Arc::new(provider)));
        let misses = InMemoryMissSink::new();
        let (recorder, _worker) = MissRecorder::spawn(Arc::new(misses.clone()));

        let resolver = Resolver::new(&config, Arc::clone(&catalog), embeddings, recorder);

        Self {
            resolver: Arc::new(resolver),
            catalog,
            misses,
            embedding_calls,
        }
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
