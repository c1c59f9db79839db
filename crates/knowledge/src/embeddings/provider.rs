//! Embedding provider trait and factory.

use crate::embeddings::config::EmbeddingConfig;
use crate::embeddings::providers::{ollama::OllamaProvider, trigram::TrigramProvider};
use docrag_core::{AppError, AppResult};
use std::sync::Arc;

/// Trait for embedding providers.
///
/// Providers report failures honestly; the zero-vector fallback policy lives
/// in [`crate::embeddings::EmbeddingEngine`].
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync + std::fmt::Debug {
    /// Get provider name (e.g., "ollama", "trigram")
    fn provider_name(&self) -> &str;

    /// Get model identifier
    fn model_name(&self) -> &str;

    /// Get embedding dimensions
    fn dimensions(&self) -> usize;

    /// Generate the embedding for a single text.
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>>;

    /// Generate embeddings for multiple texts, in order.
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.embed(text).await?);
        }
        Ok(embeddings)
    }
}

/// Supported provider names.
pub const SUPPORTED_PROVIDERS: [&str; 2] = ["ollama", "trigram"];

/// Create an embedding provider based on configuration.
pub fn create_provider(config: &EmbeddingConfig) -> AppResult<Arc<dyn EmbeddingProvider>> {
    config.validate()?;

    match config.provider.as_str() {
        "ollama" => Ok(Arc::new(OllamaProvider::new(config)?)),
        "trigram" => Ok(Arc::new(TrigramProvider::new(config.dimensions))),
        other => Err(AppError::Config(format!(
            "Unknown embedding provider: '{}'. Supported providers: {}",
            other,
            SUPPORTED_PROVIDERS.join(", ")
        ))),
    }
}
