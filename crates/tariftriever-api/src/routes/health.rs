use crate::AppState;
use crate::middleware::RequestContext;
use axum::{
    Extension, Json, Router,
    extract::State,
    routing::get,
};
use serde::Serialize;
use tariftriever_common::CorrelationId;
use tracing::{info, instrument};

pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// "healthy" once a catalog is loaded, "degraded" before that
    pub status: &'static str,
    pub service: &'static str,
    pub catalog_loaded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_generation: Option<u64>,
    pub embedding_ready: bool,
    pub correlation_id: CorrelationId,
}

/// Never fails; a missing catalog or embedding backend is reported, not raised
#[instrument(skip_all, fields(correlation_id))]
async fn health_check(
    State(state): State<AppState>,
    context: Option<Extension<RequestContext>>,
) -> Json<HealthResponse> {
    let correlation_id = RequestContext::correlation_id_or_new(context.as_deref());
    tracing::Span::current().record("correlation_id", correlation_id.to_string());

    let snapshot = state.catalog().snapshot().ok();
    let embedding_ready = state.embeddings.provider().is_ready().await;

    info!(
        correlation_id = %correlation_id,
        catalog_loaded = snapshot.is_some(),
        embedding_ready,
        "Health check request"
    );

    Json(HealthResponse {
        status: if snapshot.is_some() { "healthy" } else { "degraded" },
        service: "tariftriever-api",
        catalog_loaded: snapshot.is_some(),
        catalog_size: snapshot.as_ref().map(|catalog| catalog.len()),
        catalog_generation: snapshot.as_ref().map(|catalog| catalog.generation()),
        embedding_ready,
        correlation_id,
    })
}

#[cfg(test)]
mod tests {
    use crate::routes::create_router;
    use crate::test_utils::{TestResult, app_state, body_json, get_request};
    use axum::http::StatusCode;
    use tariftriever_search::test_utils::TestHarness;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_health_reports_loaded_catalog() -> TestResult {
        let harness = TestHarness::new();
        let (state, _) = app_state(&harness);

        let response = create_router(state).oneshot(get_request("/health")).await?;
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["catalog_loaded"], true);
        assert_eq!(json["catalog_size"], 9);
        assert_eq!(json["catalog_generation"], 1);
        assert_eq!(json["embedding_ready"], true);
        assert!(json["correlation_id"].is_string());
        Ok(())
    }

    #[tokio::test]
    async fn test_health_degraded_without_catalog() -> TestResult {
        let harness = TestHarness::unloaded();
        let (state, _) = app_state(&harness);

        let response = create_router(state).oneshot(get_request("/health")).await?;
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["status"], "degraded");
        assert_eq!(json["catalog_loaded"], false);
        assert!(json.get("catalog_size").is_none());
        Ok(())
    }
}
