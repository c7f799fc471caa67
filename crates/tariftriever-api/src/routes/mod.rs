pub mod catalog;
pub mod health;
pub mod resolve;
pub mod stats;

use crate::AppState;
use axum::{Router, middleware};

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(health::routes())
        .merge(resolve::routes())
        .merge(stats::routes())
        .merge(catalog::routes())
        .with_state(state)
        // Add correlation ID middleware to all routes
        .layer(middleware::from_fn(
            crate::middleware::correlation_id_middleware,
        ))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::error::CORRELATION_ID_HEADER;
    use crate::test_utils::{TestResult, app_state, get_request};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tariftriever_search::test_utils::TestHarness;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_inbound_correlation_id_is_echoed() -> TestResult {
        let harness = TestHarness::new();
        let (state, _) = app_state(&harness);
        let id = "6f1c2a52-7a1e-4c55-9a8e-3c1f0b9d2e41";

        let response = create_router(state)
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header(CORRELATION_ID_HEADER, id)
                    .body(Body::empty())?,
            )
            .await?;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get(CORRELATION_ID_HEADER).unwrap(), id);
        Ok(())
    }

    #[tokio::test]
    async fn test_correlation_id_generated_when_missing() -> TestResult {
        let harness = TestHarness::new();
        let (state, _) = app_state(&harness);

        let response = create_router(state).oneshot(get_request("/health")).await?;

        let header = response.headers().get(CORRELATION_ID_HEADER).unwrap();
        assert_eq!(header.to_str()?.len(), 36);
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() -> TestResult {
        let harness = TestHarness::new();
        let (state, _) = app_state(&harness);

        let response = create_router(state).oneshot(get_request("/nope")).await?;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        Ok(())
    }
}
