//! Exact and prefix-family code matching

use crate::{Method, NormalizedQuery, SearchResult};
use std::sync::Arc;
use tariftriever_catalog::Catalog;
use tariftriever_config::ResolverConfig;

#[derive(Debug, Clone, Copy)]
pub struct ExactMatcher {
    min_prefix_len: usize,
    max_prefix_results: usize,
}

impl ExactMatcher {
    pub const fn new(min_prefix_len: usize, max_prefix_results: usize) -> Self {
        Self {
            min_prefix_len,
            max_prefix_results,
        }
    }

    pub const fn from_config(config: &ResolverConfig) -> Self {
        Self::new(config.min_prefix_len, config.max_prefix_results)
    }

    /// A verbatim hit scores 1.0 and stands alone. Otherwise the nearest
    /// members of the code family sharing the query as prefix are returned,
    /// scored `query_len / code_len`.
    pub fn match_exact(&self, query: &NormalizedQuery, catalog: &Catalog) -> Vec<SearchResult> {
        if !query.looks_like_code || query.is_empty() {
            return Vec::new();
        }

        if let Some((position, entry)) = catalog.get(&query.text) {
            return vec![SearchResult::new(
                Arc::clone(entry),
                1.0,
                Method::Exact,
                position,
            )];
        }

        let query_len = query.text.len();
        if query_len < self.min_prefix_len {
            return Vec::new();
        }

        let mut family: Vec<SearchResult> = catalog
            .with_prefix(&query.text)
            .map(|(position, entry)| {
                let score = query_len as f32 / entry.code.len() as f32;
                SearchResult::new(Arc::clone(entry), score, Method::Exact, position)
            })
            .collect();

        family.sort_by(|a, b| {
            a.entry
                .code
                .len()
                .cmp(&b.entry.code.len())
                .then_with(|| a.entry.code.cmp(&b.entry.code))
        });
        family.truncate(self.max_prefix_results);
        family
    }
}
