//! Embedding provider implementations.
//!
//! - **[`DisabledProvider`]** returns [`RagError::ProviderUnavailable`] for
//!   every call; used when `embedding.provider = "disabled"`.
//! - **[`OpenAIProvider`]** calls `POST {base_url}/embeddings`.
//!
//! Use [`create_provider`] to build the provider named in the configuration.
//!
//! ```rust,no_run
//! # use grounded_rag::config::EmbeddingConfig;
//! # use grounded_rag::embedding::create_provider;
//! let config = EmbeddingConfig {
//!     provider: "disabled".to_string(),
//!     ..EmbeddingConfig::default()
//! };
//! let provider = create_provider(&config).unwrap();
//! assert_eq!(provider.model_name(), "disabled");
//! ```
//!
//! Failures are never retried here: a transport failure surfaces as
//! `ProviderUnavailable`, an HTTP error status as `Provider`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use grounded_rag_core::embedding::EmbeddingProvider;
use grounded_rag_core::{RagError, Result};

use crate::config::EmbeddingConfig;
use crate::openai::{self, PROVIDER};

/// Maximum number of inputs sent in a single embeddings request.
const MAX_BATCH: usize = 64;

// ============ Disabled Provider ============

pub struct DisabledProvider;

#[async_trait]
impl EmbeddingProvider for DisabledProvider {
    fn model_name(&self) -> &str {
        "disabled"
    }

    fn dims(&self) -> Option<usize> {
        None
    }

    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Err(disabled())
    }

    async fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Err(disabled())
    }
}

fn disabled() -> RagError {
    RagError::ProviderUnavailable {
        provider: "disabled".into(),
        message: "embedding provider is disabled".into(),
    }
}

// ============ OpenAI Provider ============

/// Embedding provider for the OpenAI embeddings API (or any compatible
/// endpoint reachable at `base_url`).
pub struct OpenAIProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    dims: Option<usize>,
    url: String,
}

impl OpenAIProvider {
    /// Build a provider with an explicit credential.
    ///
    /// # Errors
    ///
    /// [`RagError::Configuration`] if the key or model is blank.
    pub fn new(config: &EmbeddingConfig, api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(RagError::Configuration("API key must not be empty".into()));
        }
        if config.model.trim().is_empty() {
            return Err(RagError::Configuration(
                "embedding.model required for OpenAI provider".into(),
            ));
        }

        Ok(Self {
            client: openai::build_client(config.timeout_secs)?,
            api_key,
            model: config.model.clone(),
            dims: config.dims,
            url: openai::endpoint(&config.base_url, "embeddings"),
        })
    }

    /// Build a provider using the `OPENAI_API_KEY` environment variable.
    pub fn from_env(config: &EmbeddingConfig) -> Result<Self> {
        Self::new(config, openai::api_key_from_env()?)
    }

    async fn request(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        debug!(
            provider = PROVIDER,
            batch_size = texts.len(),
            model = %self.model,
            "embedding batch"
        );

        let body = EmbeddingRequest {
            model: &self.model,
            input: texts,
            dimensions: self.dims,
        };

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(openai::transport_error)?;

        if !response.status().is_success() {
            return Err(openai::status_error(response).await);
        }

        let status = response.status().as_u16();
        let text = response.text().await.map_err(openai::transport_error)?;
        let vectors = parse_embedding_response(&text, texts.len())
            .map_err(|e| openai::parse_error(status, e))?;

        if let Some(expected) = self.dims {
            if let Some(v) = vectors.iter().find(|v| v.len() != expected) {
                return Err(RagError::DimensionMismatch {
                    expected,
                    found: v.len(),
                    source_label: format!("{} response", self.model),
                });
            }
        }

        Ok(vectors)
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}

/// Parse an embeddings response body, ordering vectors by their `index`
/// field and checking that one vector came back per input.
fn parse_embedding_response(body: &str, expected: usize) -> std::result::Result<Vec<Vec<f32>>, String> {
    let mut response: EmbeddingResponse = serde_json::from_str(body).map_err(|e| e.to_string())?;
    if response.data.len() != expected {
        return Err(format!(
            "expected {} embeddings, got {}",
            expected,
            response.data.len()
        ));
    }
    response.data.sort_by_key(|d| d.index);
    let vectors: Vec<Vec<f32>> = response.data.into_iter().map(|d| d.embedding).collect();
    if vectors.iter().any(|v| v.is_empty()) {
        return Err("empty embedding vector".into());
    }
    Ok(vectors)
}

#[async_trait]
impl EmbeddingProvider for OpenAIProvider {
    fn model_name(&self) -> &str {
        &self.model
    }

    fn dims(&self) -> Option<usize> {
        self.dims
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let batch = self.request(&[text.to_string()]).await?;
        batch.into_iter().next().ok_or_else(|| RagError::Provider {
            provider: PROVIDER.into(),
            status: 200,
            message: "API returned empty response".into(),
        })
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut out = Vec::with_capacity(texts.len());
        for batch in texts.chunks(MAX_BATCH) {
            out.extend(self.request(batch).await?);
        }
        Ok(out)
    }
}

/// Create the [`EmbeddingProvider`] named by `config.provider`.
///
/// | Config Value | Provider |
/// |-------------|----------|
/// | `"disabled"` | [`DisabledProvider`] |
/// | `"openai"` | [`OpenAIProvider`] |
///
/// # Errors
///
/// [`RagError::Configuration`] for unknown providers or a missing API key.
pub fn create_provider(config: &EmbeddingConfig) -> Result<Box<dyn EmbeddingProvider>> {
    match config.provider.as_str() {
        "disabled" => Ok(Box::new(DisabledProvider)),
        "openai" => Ok(Box::new(OpenAIProvider::from_env(config)?)),
        other => Err(RagError::Configuration(format!(
            "Unknown embedding provider: {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grounded_rag_core::embedding::embed_text;

    #[test]
    fn parse_orders_by_index() {
        let body = r#"{
            "object": "list",
            "data": [
                {"object": "embedding", "index": 1, "embedding": [0.0, 1.0]},
                {"object": "embedding", "index": 0, "embedding": [1.0, 0.0]}
            ],
            "model": "text-embedding-3-small"
        }"#;
        let vectors = parse_embedding_response(body, 2).unwrap();
        assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[test]
    fn parse_rejects_count_mismatch_and_garbage() {
        let body = r#"{"data": [{"index": 0, "embedding": [1.0]}]}"#;
        assert!(parse_embedding_response(body, 2).is_err());
        assert!(parse_embedding_response("not json", 1).is_err());
        let empty = r#"{"data": [{"index": 0, "embedding": []}]}"#;
        assert!(parse_embedding_response(empty, 1).is_err());
    }

    #[tokio::test]
    async fn disabled_provider_is_unavailable() {
        let err = DisabledProvider.embed("hello").await.unwrap_err();
        assert!(err.is_unavailable());
    }

    #[tokio::test]
    async fn blank_text_is_rejected_before_provider() {
        // The disabled provider would report unavailable; blank input wins.
        let err = embed_text(&DisabledProvider, "   ").await.unwrap_err();
        assert!(matches!(err, RagError::EmptyInput));
    }

    #[test]
    fn blank_key_is_configuration_error() {
        let err = OpenAIProvider::new(&EmbeddingConfig::default(), "  ")
            .err()
            .unwrap();
        assert!(matches!(err, RagError::Configuration(_)));
    }

    #[test]
    fn create_disabled_provider() {
        let config = EmbeddingConfig {
            provider: "disabled".into(),
            ..EmbeddingConfig::default()
        };
        let provider = create_provider(&config).unwrap();
        assert_eq!(provider.model_name(), "disabled");
        assert_eq!(provider.dims(), None);
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_unavailable() {
        let config = EmbeddingConfig {
            base_url: "http://127.0.0.1:9".into(),
            timeout_secs: 2,
            ..EmbeddingConfig::default()
        };
        let provider = OpenAIProvider::new(&config, "sk-test").unwrap();
        let err = provider.embed("hello").await.unwrap_err();
        assert!(err.is_unavailable(), "got {err:?}");
    }
}
