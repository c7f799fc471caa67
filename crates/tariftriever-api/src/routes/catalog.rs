use crate::middleware::RequestContext;
use crate::{ApiError, ApiResult, AppState};
use axum::{
    Extension, Json, Router,
    extract::State,
    routing::post,
};
use serde::Serialize;
use tariftriever_common::CorrelationId;
use tariftriever_common::error_sanitizer::sanitize_with_message;
use tracing::{info, instrument};

pub fn routes() -> Router<AppState> {
    Router::new().route("/catalog/reload", post(reload_handler))
}

#[derive(Debug, Serialize)]
pub struct ReloadResponse {
    pub generation: u64,
    pub size: usize,
    pub with_embeddings: usize,
    pub source: String,
    pub correlation_id: CorrelationId,
}

/// Load a fresh catalog from the configured provider and swap it in.
/// In-flight resolutions finish against the snapshot they started with.
///
/// # Errors
/// Returns `CatalogReloadFailed` when loading fails; the previous snapshot
/// stays active
#[instrument(skip_all, fields(correlation_id))]
pub async fn reload_handler(
    State(state): State<AppState>,
    context: Option<Extension<RequestContext>>,
) -> ApiResult<Json<ReloadResponse>> {
    let correlation_id = RequestContext::correlation_id_or_new(context.as_deref());
    tracing::Span::current().record("correlation_id", correlation_id.to_string());

    let catalog = state
        .catalog()
        .reload(state.catalog_provider.as_ref())
        .await
        .map_err(|e| {
            let message =
                sanitize_with_message(e, "catalog_reload", "Catalog reload failed", &correlation_id);
            ApiError::CatalogReloadFailed {
                message,
                correlation_id: correlation_id.clone(),
            }
        })?;

    info!(
        correlation_id = %correlation_id,
        generation = catalog.generation(),
        size = catalog.len(),
        "Catalog reloaded"
    );

    Ok(Json(ReloadResponse {
        generation: catalog.generation(),
        size: catalog.len(),
        with_embeddings: catalog.embedded_count(),
        source: catalog.source_name().to_string(),
        correlation_id,
    }))
}
