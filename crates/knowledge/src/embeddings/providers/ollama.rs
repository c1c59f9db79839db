//! Ollama Embedding Provider
//!
//! Provides semantic embeddings via Ollama's local API using models like nomic-embed-text.
//!
//! # Features
//! - Neural semantic embeddings (768-dim by default)
//! - Local-first (no API costs, privacy-preserving)
//! - Automatic retry with exponential backoff
//!
//! Construction never touches the network; an unreachable server surfaces
//! as an [`AppError::Embedding`] on the first request.

use crate::embeddings::{EmbeddingConfig, EmbeddingProvider};
use async_trait::async_trait;
use docrag_core::{AppError, AppResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Ollama API path for embeddings
const EMBEDDING_PATH: &str = "/api/embeddings";

/// Initial backoff duration in milliseconds
const INITIAL_BACKOFF_MS: u64 = 100;

/// Longest wait between two attempts
const MAX_BACKOFF_MS: u64 = 10_000;

/// Ollama embedding provider using local API
#[derive(Debug, Clone)]
pub struct OllamaProvider {
    /// HTTP client for API requests
    client: Client,
    /// Full embeddings URL
    url: String,
    /// Model name (e.g., "nomic-embed-text")
    model: String,
    /// Expected embedding dimensions
    dimensions: usize,
    /// Attempts per request
    max_retries: u32,
}

/// Request payload for Ollama embeddings API
#[derive(Debug, Clone, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

/// Response from Ollama embeddings API
#[derive(Debug, Clone, Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}

/// Error response from Ollama API
#[derive(Debug, Clone, Deserialize)]
struct ErrorResponse {
    error: String,
}

impl OllamaProvider {
    /// Create a new Ollama provider from configuration.
    ///
    /// # Errors
    /// * `AppError::Embedding` - If the HTTP client cannot be built
    pub fn new(config: &EmbeddingConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                AppError::Embedding(format!("Failed to create HTTP client for Ollama: {}", e))
            })?;

        let url = format!("{}{}", config.endpoint.trim_end_matches('/'), EMBEDDING_PATH);

        debug!("Ollama provider configured: url={}, model={}", url, config.model);

        Ok(Self {
            client,
            url,
            model: config.model.clone(),
            dimensions: config.dimensions,
            max_retries: config.max_retries.max(1),
        })
    }

    /// Embed single text with retry logic
    #[instrument(skip(self, text), fields(text_len = text.len(), model = %self.model))]
    async fn embed_with_retries(&self, text: &str) -> AppResult<Vec<f32>> {
        let mut attempt = 0;

        loop {
            match self.embed_single(text).await {
                Ok(embedding) => return Ok(embedding),
                Err(e) => {
                    attempt += 1;
                    if attempt >= self.max_retries {
                        return Err(e);
                    }

                    let delay_ms = backoff_ms(attempt);
                    warn!(
                        "Embedding failed (attempt {}/{}): {}; retrying in {}ms",
                        attempt, self.max_retries, e, delay_ms
                    );
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                }
            }
        }
    }

    /// Embed single text (no retries)
    async fn embed_single(&self, text: &str) -> AppResult<Vec<f32>> {
        let request = EmbeddingRequest {
            model: &self.model,
            prompt: text,
        };

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                AppError::Embedding(format!("Failed to send request to Ollama: {}", e))
            })?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            let message = serde_json::from_str::<ErrorResponse>(&error_text)
                .map(|body| body.error)
                .unwrap_or(error_text);

            return Err(AppError::Embedding(format!(
                "Ollama API error ({}): {}",
                status, message
            )));
        }

        let body: EmbeddingResponse = response.json().await.map_err(|e| {
            AppError::Embedding(format!("Failed to parse Ollama response: {}", e))
        })?;

        if body.embedding.len() != self.dimensions {
            return Err(AppError::Embedding(format!(
                "Unexpected embedding dimensions from '{}': got {}, expected {}",
                self.model,
                body.embedding.len(),
                self.dimensions
            )));
        }

        Ok(body.embedding)
    }
}

/// Exponential backoff before retry number `attempt`, capped at [`MAX_BACKOFF_MS`].
fn backoff_ms(attempt: u32) -> u64 {
    2_u64
        .checked_pow(attempt)
        .map_or(MAX_BACKOFF_MS, |factor| INITIAL_BACKOFF_MS.saturating_mul(factor))
        .min(MAX_BACKOFF_MS)
}

#[async_trait]
impl EmbeddingProvider for OllamaProvider {
    fn provider_name(&self) -> &str {
        "ollama"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    #[instrument(skip(self, text), fields(text_len = text.len(), provider = "ollama", model = %self.model))]
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        if text.trim().is_empty() {
            return Err(AppError::Embedding("Cannot embed empty text".to_string()));
        }

        self.embed_with_retries(text).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer, dimensions: usize) -> EmbeddingConfig {
        EmbeddingConfig {
            provider: "ollama".to_string(),
            model: "nomic-embed-text".to_string(),
            endpoint: server.uri(),
            dimensions,
            timeout_secs: 5,
            max_retries: 2,
            concurrency: 1,
        }
    }

    #[tokio::test]
    async fn test_embed_posts_model_and_prompt() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/embeddings"))
            .and(body_json(json!({"model": "nomic-embed-text", "prompt": "hello world"})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"embedding": [0.1, 0.2, 0.3]})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let provider = OllamaProvider::new(&config_for(&server, 3)).unwrap();
        let embedding = provider.embed("hello world").await.unwrap();

        assert_eq!(embedding, vec![0.1, 0.2, 0.3]);
    }

    #[tokio::test]
    async fn test_api_error_is_reported_after_retries() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/embeddings"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({"error": "model not found"})),
            )
            .expect(2)
            .mount(&server)
            .await;

        let provider = OllamaProvider::new(&config_for(&server, 3)).unwrap();
        let err = provider.embed("hello").await.unwrap_err();

        assert!(matches!(err, AppError::Embedding(_)));
        assert!(err.to_string().contains("model not found"));
    }

    #[tokio::test]
    async fn test_wrong_dimensions_are_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/embeddings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"embedding": [1.0]})))
            .mount(&server)
            .await;

        let provider = OllamaProvider::new(&config_for(&server, 3)).unwrap();
        let err = provider.embed("hello").await.unwrap_err();

        assert!(err.to_string().contains("got 1, expected 3"));
    }

    #[tokio::test]
    async fn test_malformed_body_is_embedding_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/embeddings"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let provider = OllamaProvider::new(&config_for(&server, 3)).unwrap();
        assert!(matches!(
            provider.embed("hello").await,
            Err(AppError::Embedding(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_text_is_rejected_without_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let provider = OllamaProvider::new(&config_for(&server, 3)).unwrap();
        assert!(provider.embed("   ").await.is_err());
    }

    #[test]
    fn test_backoff_doubles_then_caps() {
        assert_eq!(backoff_ms(1), 200);
        assert_eq!(backoff_ms(2), 400);
        assert_eq!(backoff_ms(7), MAX_BACKOFF_MS);
        assert_eq!(backoff_ms(59), MAX_BACKOFF_MS);
        assert_eq!(backoff_ms(64), MAX_BACKOFF_MS);
        assert_eq!(backoff_ms(u32::MAX), MAX_BACKOFF_MS);
    }

    #[test]
    fn test_trailing_slash_in_endpoint() {
        let config = EmbeddingConfig {
            endpoint: "http://localhost:11434/".to_string(),
            ..Default::default()
        };
        let provider = OllamaProvider::new(&config).unwrap();
        assert_eq!(provider.url, "http://localhost:11434/api/embeddings");
    }
}
