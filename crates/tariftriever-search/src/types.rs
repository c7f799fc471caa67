//! Query and result types shared by every tier

use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;
use tariftriever_catalog::CatalogEntry;
use tariftriever_common::Language;

/// A user query as received from a caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub raw_text: String,
    pub language: Language,
    /// Opaque caller identifier, carried into miss records
    pub user_id: Option<i64>,
    /// Surface the query arrived through, carried into miss records
    pub source: String,
}

impl Query {
    pub fn new(raw_text: impl Into<String>, language: Language) -> Self {
        Self {
            raw_text: raw_text.into(),
            language,
            user_id: None,
            source: "api".to_string(),
        }
    }

    #[must_use]
    pub const fn with_user(mut self, user_id: Option<i64>) -> Self {
        self.user_id = user_id;
        self
    }

    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }
}

/// Canonical form of a query
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NormalizedQuery {
    /// Cleaned text; the bare digit string for code-like queries
    pub text: String,
    pub looks_like_code: bool,
    /// Content tokens with stopwords and single characters removed
    pub tokens: Vec<String>,
}

impl NormalizedQuery {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Which tier produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    Exact,
    Lexical,
    Semantic,
}

impl Method {
    /// Tie-break rank, lower wins
    pub const fn priority(self) -> u8 {
        match self {
            Self::Exact => 0,
            Self::Lexical => 1,
            Self::Semantic => 2,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Lexical => "lexical",
            Self::Semantic => "semantic",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Confidence band shown next to a score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    pub const HIGH_THRESHOLD: f32 = 0.85;
    pub const MEDIUM_THRESHOLD: f32 = 0.70;

    pub fn from_score(score: f32) -> Self {
        if score >= Self::HIGH_THRESHOLD {
            Self::High
        } else if score >= Self::MEDIUM_THRESHOLD {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        })
    }
}

/// One ranked candidate
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub entry: Arc<CatalogEntry>,
    /// Always within `[0, 1]`
    pub score: f32,
    pub method: Method,
    /// Catalog insertion position, the final tie-break
    pub position: usize,
}

impl SearchResult {
    /// Build a result, clamping `score` into `[0, 1]`
    pub fn new(entry: Arc<CatalogEntry>, score: f32, method: Method, position: usize) -> Self {
        let score = if score.is_nan() {
            0.0
        } else {
            score.clamp(0.0, 1.0)
        };
        Self {
            entry,
            score,
            method,
            position,
        }
    }

    pub fn code(&self) -> &str {
        &self.entry.code
    }

    pub fn confidence(&self) -> Confidence {
        Confidence::from_score(self.score)
    }
}

/// Common result ordering: score descending, then method priority, then
/// catalog insertion order.
pub fn compare_results(a: &SearchResult, b: &SearchResult) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.method.priority().cmp(&b.method.priority()))
        .then_with(|| a.position.cmp(&b.position))
}

/// Sort in place by [`compare_results`]
pub fn rank(results: &mut [SearchResult]) {
    results.sort_by(compare_results);
}
