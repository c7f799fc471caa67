//! Tariftriever hybrid resolution engine
//!
//! Turns a free-text or partial-code query into ranked catalog candidates.
//! Cheap deterministic tiers (exact code, lexical overlap) run first; the
//! embedding-based semantic tier is only consulted when they are not
//! confident. See [`Resolver`] for the tier sequencing.

pub mod cache;
pub mod error;
pub mod lexicon;
pub mod matching;
pub mod normalizer;
pub mod resolver;
pub mod stopwords;
pub mod types;

pub use error::{ResolveResult, SearchError};
pub use matching::{ExactMatcher, LexicalMatcher, SemanticMatcher};
pub use normalizer::Normalizer;
pub use resolver::{Resolution, Resolver, ResolverState};
pub use types::{
    Confidence, Method, NormalizedQuery, Query, SearchResult, compare_results, rank,
};

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
