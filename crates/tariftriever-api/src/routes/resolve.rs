//! Tariff code resolution endpoint
//!
//! ```json
//! POST /resolve
//! { "query": "яблоки свежие", "language": "ru", "user_id": 42 }
//! ```
//!
//! Response:
//! ```json
//! {
//!   "results": [
//!     { "code": "080810", "description": "Яблоки свежие", "score": 1.0,
//!       "method": "lexical", "confidence": "high" }
//!   ],
//!   "states": ["init", "exact_attempted", "lexical_attempted", "resolved"],
//!   "correlation_id": "…",
//!   "cached": false,
//!   "catalog_generation": 1
//! }
//! ```
//!
//! An empty `results` list is a normal response (a miss), not an error.

use crate::middleware::RequestContext;
use crate::{ApiError, ApiResult, AppState};
use axum::{
    Extension, Json, Router,
    extract::State,
    routing::post,
};
use serde::{Deserialize, Serialize};
use tariftriever_common::{CorrelationId, Language};
use tariftriever_search::{Confidence, Method, Query, Resolution, ResolverState, SearchResult};
use tracing::{info, instrument, warn};

pub fn routes() -> Router<AppState> {
    Router::new().route("/resolve", post(resolve_handler))
}

#[derive(Debug, Deserialize)]
pub struct ResolveRequest {
    /// Free text or a (partial) tariff code
    pub query: String,
    /// ISO 639 code; defaults to Russian
    #[serde(default)]
    pub language: Option<String>,
    /// Opaque caller id, stored with misses
    #[serde(default)]
    pub user_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ResolvedCode {
    pub code: String,
    pub description: String,
    pub score: f32,
    pub method: Method,
    pub confidence: Confidence,
}

impl From<&SearchResult> for ResolvedCode {
    fn from(result: &SearchResult) -> Self {
        Self {
            code: result.entry.code.clone(),
            description: result.entry.description.clone(),
            score: result.score,
            method: result.method,
            confidence: result.confidence(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ResolveResponse {
    pub results: Vec<ResolvedCode>,
    /// FSM states visited, in order
    pub states: Vec<ResolverState>,
    pub correlation_id: CorrelationId,
    pub cached: bool,
    pub catalog_generation: u64,
}

impl From<Resolution> for ResolveResponse {
    fn from(resolution: Resolution) -> Self {
        Self {
            results: resolution.results.iter().map(ResolvedCode::from).collect(),
            states: resolution.states,
            correlation_id: resolution.correlation_id,
            cached: resolution.cached,
            catalog_generation: resolution.catalog_generation,
        }
    }
}

/// # Errors
/// - `InvalidQuery` for blank or oversized queries and malformed languages
/// - `CatalogUnavailable` when no catalog has been loaded
#[instrument(skip_all, fields(correlation_id))]
pub async fn resolve_handler(
    State(state): State<AppState>,
    context: Option<Extension<RequestContext>>,
    Json(req): Json<ResolveRequest>,
) -> ApiResult<Json<ResolveResponse>> {
    let correlation_id = RequestContext::correlation_id_or_new(context.as_deref());
    tracing::Span::current().record("correlation_id", correlation_id.to_string());

    if req.query.trim().is_empty() {
        warn!(correlation_id = %correlation_id, "Empty query rejected");
        return Err(ApiError::invalid_query("Query cannot be empty", correlation_id));
    }

    let query_chars = req.query.chars().count();
    if query_chars > state.max_query_chars {
        warn!(
            correlation_id = %correlation_id,
            query_chars,
            "Query too long rejected"
        );
        return Err(ApiError::invalid_query(
            format!(
                "Query exceeds maximum length of {} characters",
                state.max_query_chars
            ),
            correlation_id,
        ));
    }

    let language = match req.language.as_deref().map(Language::try_from).transpose() {
        Ok(language) => language.unwrap_or_default(),
        Err(err) => {
            warn!(correlation_id = %correlation_id, code = %err.code, "Invalid language rejected");
            return Err(ApiError::invalid_query(err.to_string(), correlation_id));
        }
    };

    let query = Query::new(req.query, language)
        .with_user(req.user_id)
        .with_source("api");

    let resolution = state
        .resolver
        .resolve_with_correlation(&query, &correlation_id)
        .await?;

    info!(
        correlation_id = %correlation_id,
        result_count = resolution.results.len(),
        method = resolution.method().map_or("none", Method::as_str),
        cached = resolution.cached,
        "Query resolved"
    );

    Ok(Json(ResolveResponse::from(resolution)))
}
