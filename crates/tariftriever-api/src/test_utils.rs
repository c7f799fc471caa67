//! Unit test utilities

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use crate::AppState;
use axum::body::Body;
use axum::http::{Request, Response};
use std::sync::Arc;
use tariftriever_catalog::MockCatalogProvider;
use tariftriever_embeddings::DefaultEmbeddingService;
use tariftriever_search::test_utils::{TestHarness, fixture_embeddings, fixture_entries};

/// Standard test result type for all test functions
pub type TestResult = Result<(), Box<dyn std::error::Error>>;

/// State over a [`TestHarness`], reloading from a mock provider that serves
/// the fixture catalog
pub fn app_state(harness: &TestHarness) -> (AppState, MockCatalogProvider) {
    let provider = MockCatalogProvider::new(fixture_entries());
    let embeddings = DefaultEmbeddingService::with_provider(Arc::new(fixture_embeddings()));

    let state = AppState::new(
        Arc::clone(&harness.resolver),
        Arc::new(provider.clone()),
        Arc::new(harness.misses.clone()),
        Arc::new(embeddings),
    );
    (state, provider)
}

pub fn json_request(method: &str, uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
