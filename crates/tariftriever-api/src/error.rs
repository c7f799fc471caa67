//! Structured API error handling
//!
//! Every variant carries the request's correlation id. Messages returned to
//! clients never include internal details; those are logged under the same
//! correlation id before the response is built.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tariftriever_common::CorrelationId;
use tariftriever_search::SearchError;
use thiserror::Error;
use tracing::{error, warn};

pub const CORRELATION_ID_HEADER: &str = "X-Correlation-ID";

#[derive(Debug, Error)]
pub enum ApiError {
    /// The query failed validation (empty, too long, bad language)
    #[error("Invalid query: {reason} (correlation: {correlation_id})")]
    InvalidQuery {
        reason: String,
        correlation_id: CorrelationId,
    },

    /// No catalog snapshot has been loaded yet
    #[error("Catalog unavailable (correlation: {correlation_id})")]
    CatalogUnavailable { correlation_id: CorrelationId },

    /// Reloading the catalog failed; the previous snapshot is still active
    #[error("{message}")]
    CatalogReloadFailed {
        message: String,
        correlation_id: CorrelationId,
    },

    /// Miss statistics could not be computed
    #[error("{message}")]
    StatsUnavailable {
        message: String,
        correlation_id: CorrelationId,
    },

    #[error("Internal server error (correlation: {correlation_id})")]
    InternalServerError { correlation_id: CorrelationId },
}

/// Error body sent to API clients
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Machine readable error code
    pub error: String,
    /// Human readable message
    pub message: String,
    pub correlation_id: CorrelationId,
    /// Seconds to wait before retrying transient errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<u64>,
}

impl ApiError {
    pub const fn correlation_id(&self) -> &CorrelationId {
        match self {
            Self::InvalidQuery { correlation_id, .. }
            | Self::CatalogUnavailable { correlation_id }
            | Self::CatalogReloadFailed { correlation_id, .. }
            | Self::StatsUnavailable { correlation_id, .. }
            | Self::InternalServerError { correlation_id } => correlation_id,
        }
    }

    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidQuery { .. } => StatusCode::BAD_REQUEST,
            Self::CatalogUnavailable { .. }
            | Self::CatalogReloadFailed { .. }
            | Self::StatsUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            Self::InternalServerError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidQuery { .. } => "INVALID_QUERY",
            Self::CatalogUnavailable { .. } => "CATALOG_UNAVAILABLE",
            Self::CatalogReloadFailed { .. } => "CATALOG_RELOAD_FAILED",
            Self::StatsUnavailable { .. } => "STATS_UNAVAILABLE",
            Self::InternalServerError { .. } => "INTERNAL_SERVER_ERROR",
        }
    }

    pub fn invalid_query(reason: impl Into<String>, correlation_id: CorrelationId) -> Self {
        Self::InvalidQuery {
            reason: reason.into(),
            correlation_id,
        }
    }

    const fn retry_after(&self) -> Option<u64> {
        match self {
            Self::CatalogUnavailable { .. } | Self::CatalogReloadFailed { .. } => Some(30),
            Self::StatsUnavailable { .. } => Some(10),
            Self::InvalidQuery { .. } | Self::InternalServerError { .. } => None,
        }
    }
}

impl From<SearchError> for ApiError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::CatalogUnavailable {
                correlation_id,
                source,
            } => {
                error!(correlation_id = %correlation_id, error = %source, "Resolution without a catalog");
                Self::CatalogUnavailable { correlation_id }
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let correlation_id = self.correlation_id().clone();

        if status.is_server_error() {
            warn!(correlation_id = %correlation_id, error = %self, "Service error");
        } else {
            warn!(correlation_id = %correlation_id, error = %self, "Client error");
        }

        let body = ApiErrorResponse {
            error: self.error_code().to_string(),
            message: self.to_string(),
            correlation_id: correlation_id.clone(),
            retry_after: self.retry_after(),
        };

        let mut response = (status, Json(body)).into_response();
        if let Ok(header_value) = correlation_id.to_string().parse() {
            response
                .headers_mut()
                .insert(CORRELATION_ID_HEADER, header_value);
        }
        response
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let id = CorrelationId::new();
        assert_eq!(
            ApiError::invalid_query("empty", id.clone()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::CatalogUnavailable {
                correlation_id: id.clone()
            }
            .status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::InternalServerError { correlation_id: id }.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_response_carries_correlation_header_and_body() {
        let id = CorrelationId::new();
        let response = ApiError::invalid_query("Query cannot be empty", id.clone()).into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let header = response.headers().get(CORRELATION_ID_HEADER).unwrap();
        assert_eq!(header.to_str().unwrap(), id.to_string());

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "INVALID_QUERY");
        assert_eq!(json["correlation_id"], id.to_string());
        assert!(json.get("retry_after").is_none());
    }
}
