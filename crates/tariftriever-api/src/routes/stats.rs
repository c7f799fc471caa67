use crate::middleware::RequestContext;
use crate::{ApiError, ApiResult, AppState};
use axum::{
    Extension, Json, Router,
    extract::{Query, State},
    routing::get,
};
use serde::Deserialize;
use tariftriever_common::error_sanitizer::sanitize_with_message;
use tariftriever_misses::MissStats;
use tracing::{info, instrument};

/// Upper bound on `?recent=`
const MAX_RECENT: usize = 200;

pub fn routes() -> Router<AppState> {
    Router::new().route("/stats/misses", get(miss_stats_handler))
}

#[derive(Debug, Default, Deserialize)]
pub struct StatsParams {
    /// How many of the latest misses to include
    pub recent: Option<usize>,
}

/// # Errors
/// Returns `StatsUnavailable` when the miss store cannot be queried
#[instrument(skip_all, fields(correlation_id))]
pub async fn miss_stats_handler(
    State(state): State<AppState>,
    context: Option<Extension<RequestContext>>,
    Query(params): Query<StatsParams>,
) -> ApiResult<Json<MissStats>> {
    let correlation_id = RequestContext::correlation_id_or_new(context.as_deref());
    tracing::Span::current().record("correlation_id", correlation_id.to_string());

    let recent = params
        .recent
        .unwrap_or(state.stats_recent_limit)
        .min(MAX_RECENT);

    let stats = state.miss_stats.stats(recent).await.map_err(|e| {
        let message = sanitize_with_message(
            e,
            "miss_stats",
            "Miss statistics are unavailable",
            &correlation_id,
        );
        ApiError::StatsUnavailable {
            message,
            correlation_id: correlation_id.clone(),
        }
    })?;

    info!(
        correlation_id = %correlation_id,
        total = stats.total,
        recent = stats.recent.len(),
        "Miss statistics served"
    );

    Ok(Json(stats))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use crate::routes::create_router;
    use crate::test_utils::{TestResult, app_state, body_json, get_request};
    use axum::http::StatusCode;
    use std::time::Duration;
    use tariftriever_common::Language;
    use tariftriever_search::Query;
    use tariftriever_search::test_utils::TestHarness;
    use tower::ServiceExt;

    async fn record_misses(harness: &TestHarness, queries: &[(&str, Language)]) {
        for (text, language) in queries {
            let query = Query::new(*text, language.clone());
            harness.resolver.resolve(&query).await.unwrap();
        }
        assert!(
            harness
                .misses
                .wait_for(queries.len(), Duration::from_secs(1))
                .await
        );
    }

    #[tokio::test]
    async fn test_stats_aggregate_recorded_misses() -> TestResult {
        let harness = TestHarness::new();
        record_misses(
            &harness,
            &[
                ("xyzzyqwerty", Language::Ru),
                ("xyzzyqwerty", Language::Ru),
                ("qwertyuiop", Language::Uz),
            ],
        )
        .await;
        let (state, _) = app_state(&harness);

        let response = create_router(state)
            .oneshot(get_request("/stats/misses?recent=2"))
            .await?;
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["total"], 3);
        assert_eq!(json["by_language"][0]["language"], "ru");
        assert_eq!(json["by_language"][0]["count"], 2);
        assert_eq!(json["top_queries"][0]["query"], "xyzzyqwerty");
        assert_eq!(json["top_queries"].as_array().unwrap().len(), 1);
        assert_eq!(json["recent"].as_array().unwrap().len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_stats_empty_store() -> TestResult {
        let harness = TestHarness::new();
        let (state, _) = app_state(&harness);

        let response = create_router(state)
            .oneshot(get_request("/stats/misses"))
            .await?;
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["total"], 0);
        assert!(json["recent"].as_array().unwrap().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_stats_store_failure_is_sanitized() -> TestResult {
        let harness = TestHarness::new();
        harness.misses.set_failing(true);
        let (state, _) = app_state(&harness);

        let response = create_router(state)
            .oneshot(get_request("/stats/misses"))
            .await?;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let json = body_json(response).await;
        assert_eq!(json["error"], "STATS_UNAVAILABLE");
        let message = json["message"].as_str().unwrap();
        assert!(message.starts_with("Miss statistics are unavailable (ref: "));
        Ok(())
    }
}
