//! Embedding configuration types.

use docrag_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Embedding configuration for a knowledge base.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddingConfig {
    /// Provider name: "ollama", "trigram"
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Model identifier (provider-specific)
    #[serde(default = "default_model")]
    pub model: String,

    /// Base URL of the embedding service
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Embedding vector dimensions
    #[serde(default = "default_dimensions")]
    pub dimensions: usize,

    /// Per-request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Attempts per text before giving up
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Maximum embedding requests in flight
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

fn default_provider() -> String {
    "ollama".to_string()
}

fn default_model() -> String {
    "nomic-embed-text".to_string()
}

fn default_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_dimensions() -> usize {
    768
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_concurrency() -> usize {
    4
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            endpoint: default_endpoint(),
            dimensions: default_dimensions(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            concurrency: default_concurrency(),
        }
    }
}

impl EmbeddingConfig {
    /// Offline configuration backed by the trigram provider.
    pub fn trigram(dimensions: usize) -> Self {
        Self {
            provider: "trigram".to_string(),
            model: "trigram-v1".to_string(),
            dimensions,
            ..Default::default()
        }
    }

    /// Check the numeric settings.
    pub fn validate(&self) -> AppResult<()> {
        if self.dimensions == 0 {
            return Err(AppError::Config(
                "Embedding dimensions must be positive".to_string(),
            ));
        }
        if self.max_retries == 0 {
            return Err(AppError::Config(
                "Embedding max_retries must be at least 1".to_string(),
            ));
        }
        if self.concurrency == 0 {
            return Err(AppError::Config(
                "Embedding concurrency must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EmbeddingConfig::default();
        assert_eq!(config.provider, "ollama");
        assert_eq!(config.model, "nomic-embed-text");
        assert_eq!(config.endpoint, "http://localhost:11434");
        assert_eq!(config.dimensions, 768);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: EmbeddingConfig = serde_yaml::from_str("provider: trigram\ndimensions: 384\n").unwrap();
        assert_eq!(config.provider, "trigram");
        assert_eq!(config.dimensions, 384);
        assert_eq!(config.max_retries, 3);
    }

    #[test]
    fn test_validate_rejects_zero_dimensions() {
        let config = EmbeddingConfig {
            dimensions: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
