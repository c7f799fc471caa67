//! Concrete embedding providers

use crate::traits::EmbeddingProvider;
use crate::{EmbeddingError, EmbeddingResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tariftriever_config::{EmbeddingConfig, EmbeddingProviderKind};

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingDatum>,
}

#[derive(Deserialize)]
struct EmbeddingDatum {
    embedding: Vec<f32>,
    #[serde(default)]
    index: Option<usize>,
}

/// Embedding service reached over HTTP.
///
/// Speaks the common `/v1/embeddings` shape: `{"model", "input": [..]}` in,
/// `{"data": [{"embedding": [..], "index": n}]}` out.
pub struct RemoteEmbeddingProvider {
    client: reqwest::Client,
    url: String,
    model: String,
    dimension: usize,
    api_key: Option<String>,
}

impl RemoteEmbeddingProvider {
    /// # Errors
    /// Returns `EmbeddingError::Config` if the HTTP client cannot be built
    pub fn new(config: &EmbeddingConfig) -> EmbeddingResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| EmbeddingError::Config(e.to_string()))?;

        Ok(Self {
            client,
            url: config.url.clone(),
            model: config.model.clone(),
            dimension: config.dimension,
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl EmbeddingProvider for RemoteEmbeddingProvider {
    async fn embed_batch(&self, texts: &[&str]) -> EmbeddingResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let body = EmbeddingRequest {
            model: &self.model,
            input: texts,
        };

        let mut request = self.client.post(&self.url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let mut parsed: EmbeddingResponse = response.json().await?;
        if parsed.data.len() != texts.len() {
            return Err(EmbeddingError::Malformed(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                parsed.data.len()
            )));
        }

        // Servers may answer out of order when they report an index
        if parsed.data.iter().all(|d| d.index.is_some()) {
            parsed.data.sort_by_key(|d| d.index);
        }

        Ok(parsed.data.into_iter().map(|d| d.embedding).collect())
    }

    fn embedding_dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    async fn is_ready(&self) -> bool {
        true
    }
}

/// Stand-in when no embedding backend is configured
pub struct DisabledEmbeddingProvider {
    dimension: usize,
}

impl DisabledEmbeddingProvider {
    pub const fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

#[async_trait]
impl EmbeddingProvider for DisabledEmbeddingProvider {
    async fn embed_batch(&self, _texts: &[&str]) -> EmbeddingResult<Vec<Vec<f32>>> {
        Err(EmbeddingError::Unavailable(
            "embedding provider is disabled".to_string(),
        ))
    }

    fn embedding_dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &'static str {
        "disabled"
    }

    async fn is_ready(&self) -> bool {
        false
    }
}

/// Build the provider selected in configuration
///
/// # Errors
/// Returns `EmbeddingError::Config` if the remote client cannot be constructed
pub fn provider_from_config(config: &EmbeddingConfig) -> EmbeddingResult<Arc<dyn EmbeddingProvider>> {
    match config.provider {
        EmbeddingProviderKind::Remote => {
            tracing::info!(url = %config.url, model = %config.model, "Using remote embedding provider");
            Ok(Arc::new(RemoteEmbeddingProvider::new(config)?))
        }
        EmbeddingProviderKind::Disabled => {
            tracing::warn!("Embedding provider disabled; semantic tier will return no candidates");
            Ok(Arc::new(DisabledEmbeddingProvider::new(config.dimension)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> EmbeddingConfig {
        EmbeddingConfig {
            url: format!("{}/v1/embeddings", server.uri()),
            model: "test-model".to_string(),
            dimension: 3,
            timeout_seconds: 2,
            ..EmbeddingConfig::default()
        }
    }

    #[tokio::test]
    async fn test_remote_provider_parses_and_orders_by_index() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/embeddings"))
            .and(body_partial_json(serde_json::json!({
                "model": "test-model",
                "input": ["red apple", "pear"]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [
                    {"index": 1, "embedding": [0.0, 1.0, 0.0]},
                    {"index": 0, "embedding": [1.0, 0.0, 0.0]}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = RemoteEmbeddingProvider::new(&config_for(&server)).unwrap();
        let vectors = provider.embed_batch(&["red apple", "pear"]).await.unwrap();

        assert_eq!(vectors, vec![vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0]]);
    }

    #[tokio::test]
    async fn test_remote_provider_sends_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("authorization", "Bearer secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{"embedding": [1.0, 0.0, 0.0]}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut config = config_for(&server);
        config.api_key = Some("secret".to_string());
        let provider = RemoteEmbeddingProvider::new(&config).unwrap();
        assert!(provider.embed_batch(&["apple"]).await.is_ok());
    }

    #[tokio::test]
    async fn test_remote_provider_maps_http_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("model loading"))
            .mount(&server)
            .await;

        let provider = RemoteEmbeddingProvider::new(&config_for(&server)).unwrap();
        let err = provider.embed_batch(&["apple"]).await.unwrap_err();
        assert!(matches!(err, EmbeddingError::Http { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_remote_provider_rejects_wrong_count() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "data": [] })),
            )
            .mount(&server)
            .await;

        let provider = RemoteEmbeddingProvider::new(&config_for(&server)).unwrap();
        let err = provider.embed_batch(&["apple"]).await.unwrap_err();
        assert!(matches!(err, EmbeddingError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_disabled_provider_always_fails() {
        let provider = DisabledEmbeddingProvider::new(3);
        assert!(!provider.is_ready().await);
        let err = provider.embed_batch(&["apple"]).await.unwrap_err();
        assert!(matches!(err, EmbeddingError::Unavailable(_)));
    }

    #[test]
    fn test_provider_from_config_selects_disabled() {
        let config = EmbeddingConfig {
            provider: EmbeddingProviderKind::Disabled,
            ..EmbeddingConfig::default()
        };
        let provider = provider_from_config(&config).unwrap();
        assert_eq!(provider.model_name(), "disabled");
    }
}
