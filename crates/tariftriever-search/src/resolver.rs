//! Tiered resolution
//!
//! A resolution walks an explicit state machine:
//!
//! ```text
//! Init -> ExactAttempted -> LexicalAttempted -> SemanticAttempted -> Resolved
//! ```
//!
//! and may jump to `Resolved` from any attempted tier as soon as that tier is
//! confident. The visited states are returned with the results so callers
//! can see where resolution stopped.

use crate::cache::{CacheKey, CachedResolution, ResolutionCache};
use crate::matching::{ExactMatcher, LexicalMatcher, SemanticMatcher};
use crate::{Method, Normalizer, NormalizedQuery, Query, ResolveResult, SearchError, SearchResult, rank};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tariftriever_catalog::{Catalog, CatalogHandle};
use tariftriever_common::CorrelationId;
use tariftriever_config::ResolverConfig;
use tariftriever_embeddings::EmbeddingService;
use tariftriever_misses::{MissRecord, MissRecorder};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolverState {
    Init,
    ExactAttempted,
    LexicalAttempted,
    SemanticAttempted,
    Resolved,
}

impl ResolverState {
    /// Tiers only move forward; `Resolved` is reachable from anywhere but `Resolved`
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Init, Self::ExactAttempted)
                | (Self::ExactAttempted, Self::LexicalAttempted)
                | (Self::LexicalAttempted, Self::SemanticAttempted)
                | (
                    Self::Init
                        | Self::ExactAttempted
                        | Self::LexicalAttempted
                        | Self::SemanticAttempted,
                    Self::Resolved
                )
        )
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::ExactAttempted => "exact_attempted",
            Self::LexicalAttempted => "lexical_attempted",
            Self::SemanticAttempted => "semantic_attempted",
            Self::Resolved => "resolved",
        }
    }
}

impl fmt::Display for ResolverState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Visited states of one resolution
struct Trace {
    states: Vec<ResolverState>,
}

impl Trace {
    fn new() -> Self {
        Self {
            states: vec![ResolverState::Init],
        }
    }

    fn current(&self) -> ResolverState {
        self.states.last().copied().unwrap_or(ResolverState::Init)
    }

    fn advance(&mut self, next: ResolverState) {
        debug_assert!(
            self.current().can_transition_to(next),
            "illegal resolver transition {} -> {next}",
            self.current()
        );
        self.states.push(next);
    }
}

/// Outcome of one resolution
#[derive(Debug, Clone)]
pub struct Resolution {
    /// Ranked best first, at most `top_n`
    pub results: Vec<SearchResult>,
    pub states: Vec<ResolverState>,
    pub correlation_id: CorrelationId,
    pub catalog_generation: u64,
    /// Served from the resolution cache
    pub cached: bool,
}

impl Resolution {
    pub fn is_miss(&self) -> bool {
        self.results.is_empty()
    }

    pub fn best(&self) -> Option<&SearchResult> {
        self.results.first()
    }

    /// Tier that produced the best result
    pub fn method(&self) -> Option<Method> {
        self.best().map(|r| r.method)
    }

    pub fn visited(&self, state: ResolverState) -> bool {
        self.states.contains(&state)
    }
}

/// The hybrid resolution engine
pub struct Resolver {
    catalog: Arc<CatalogHandle>,
    normalizer: Normalizer,
    exact: ExactMatcher,
    lexical: LexicalMatcher,
    semantic: SemanticMatcher,
    misses: MissRecorder,
    cache: Option<ResolutionCache>,
    exact_confidence_threshold: f32,
    lexical_confidence_threshold: f32,
    top_n: usize,
}

impl Resolver {
    pub fn new(
        config: &ResolverConfig,
        catalog: Arc<CatalogHandle>,
        embeddings: Arc<dyn EmbeddingService>,
        misses: MissRecorder,
    ) -> Self {
        let normalizer = Normalizer::from_config(config);
        Self {
            catalog,
            exact: ExactMatcher::from_config(config),
            lexical: LexicalMatcher::from_config(config, normalizer.clone()),
            normalizer,
            semantic: SemanticMatcher::from_config(embeddings, config),
            misses,
            cache: ResolutionCache::new(config.cache_capacity),
            exact_confidence_threshold: config.exact_confidence_threshold,
            lexical_confidence_threshold: config.lexical_confidence_threshold,
            top_n: config.top_n,
        }
    }

    pub const fn catalog(&self) -> &Arc<CatalogHandle> {
        &self.catalog
    }

    /// Resolve `query` under a fresh correlation id
    ///
    /// # Errors
    /// Returns `SearchError::CatalogUnavailable` if no catalog has been loaded
    pub async fn resolve(&self, query: &Query) -> ResolveResult<Resolution> {
        self.resolve_with_correlation(query, &CorrelationId::new())
            .await
    }

    /// Resolve `query`, tagging logs and errors with `correlation_id`.
    ///
    /// One catalog snapshot is taken up front and used by every tier. An
    /// empty outcome hands exactly one miss record to the recorder.
    ///
    /// # Errors
    /// Returns `SearchError::CatalogUnavailable` if no catalog has been loaded
    #[tracing::instrument(
        skip_all,
        fields(
            correlation_id = %correlation_id,
            language = %query.language,
            method = tracing::field::Empty,
            result_count = tracing::field::Empty,
            cached = false
        )
    )]
    pub async fn resolve_with_correlation(
        &self,
        query: &Query,
        correlation_id: &CorrelationId,
    ) -> ResolveResult<Resolution> {
        let started = Instant::now();
        let catalog = self
            .catalog
            .snapshot()
            .map_err(|source| SearchError::CatalogUnavailable {
                correlation_id: correlation_id.clone(),
                source,
            })?;

        let normalized = self.normalizer.normalize(&query.raw_text, &query.language);
        let key = CacheKey {
            text: normalized.text.clone(),
            looks_like_code: normalized.looks_like_code,
            language: query.language.code().to_string(),
            generation: catalog.generation(),
        };

        if let Some(cache) = &self.cache
            && let Some(hit) = cache.get(&key)
        {
            tracing::Span::current().record("cached", true);
            tracing::Span::current().record("result_count", hit.results.len());
            metrics::counter!("tariftriever_resolution_cache_hits_total").increment(1);
            return Ok(Resolution {
                results: hit.results,
                states: hit.states,
                correlation_id: correlation_id.clone(),
                catalog_generation: catalog.generation(),
                cached: true,
            });
        }

        let (results, trace) = self.run_tiers(&normalized, &catalog).await;
        let method = results.first().map_or("none", |r| r.method.as_str());
        tracing::Span::current().record("method", method);
        tracing::Span::current().record("result_count", results.len());

        if results.is_empty() {
            self.misses.record_miss(MissRecord::new(
                query.raw_text.clone(),
                query.language.clone(),
                query.user_id,
                query.source.clone(),
            ));
            metrics::counter!("tariftriever_resolution_misses_total").increment(1);
        } else if let Some(cache) = &self.cache {
            cache.put(
                key,
                CachedResolution {
                    results: results.clone(),
                    states: trace.states.clone(),
                },
            );
        }

        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        metrics::counter!("tariftriever_resolutions_total", "method" => method).increment(1);
        metrics::histogram!("tariftriever_resolution_duration_ms").record(elapsed_ms);
        tracing::info!(
            states = ?trace.states,
            elapsed_ms,
            "Resolved query"
        );

        Ok(Resolution {
            results,
            states: trace.states,
            correlation_id: correlation_id.clone(),
            catalog_generation: catalog.generation(),
            cached: false,
        })
    }

    async fn run_tiers(
        &self,
        query: &NormalizedQuery,
        catalog: &Catalog,
    ) -> (Vec<SearchResult>, Trace) {
        let mut trace = Trace::new();

        trace.advance(ResolverState::ExactAttempted);
        let exact = self.exact.match_exact(query, catalog);
        if exact
            .iter()
            .any(|r| r.score >= self.exact_confidence_threshold)
        {
            trace.advance(ResolverState::Resolved);
            return (self.finish(exact), trace);
        }

        trace.advance(ResolverState::LexicalAttempted);
        let lexical = self.lexical.match_lexical(query, catalog);
        if lexical
            .iter()
            .any(|r| r.score >= self.lexical_confidence_threshold)
        {
            trace.advance(ResolverState::Resolved);
            return (self.finish(lexical), trace);
        }

        trace.advance(ResolverState::SemanticAttempted);
        let semantic = self.semantic.match_semantic(query, catalog).await;
        trace.advance(ResolverState::Resolved);
        if !semantic.is_empty() {
            return (self.finish(semantic), trace);
        }

        // Nothing confident anywhere: weak prefix and lexical candidates are
        // still better than a miss.
        let mut carried = exact;
        carried.extend(lexical);
        if !carried.is_empty() {
            tracing::debug!(
                carried = carried.len(),
                "Returning weak deterministic candidates"
            );
        }
        (self.finish(carried), trace)
    }

    fn finish(&self, mut results: Vec<SearchResult>) -> Vec<SearchResult> {
        rank(&mut results);
        results.truncate(self.top_n);
        results
    }
}
