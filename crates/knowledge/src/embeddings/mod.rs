//! Embedding engine for knowledge bases.
//!
//! Wraps an [`EmbeddingProvider`] with the degraded-availability policy: a
//! text that cannot be embedded gets a zero vector of the configured
//! dimensionality instead of failing the whole batch. Every substitution is
//! logged, counted and flagged on the returned [`Embedding`].

pub mod config;
pub mod provider;
pub mod providers;

pub use config::EmbeddingConfig;
pub use provider::{create_provider, EmbeddingProvider};

use futures::stream::{self, StreamExt};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Result of embedding one text.
#[derive(Debug, Clone, PartialEq)]
pub struct Embedding {
    pub vector: Vec<f32>,
    /// True when `vector` is the zero-vector fallback
    pub degraded: bool,
}

impl Embedding {
    fn zero(dimensions: usize) -> Self {
        Self {
            vector: vec![0.0; dimensions],
            degraded: true,
        }
    }
}

/// Provider wrapper that never fails.
#[derive(Debug)]
pub struct EmbeddingEngine {
    provider: Arc<dyn EmbeddingProvider>,
    dimensions: usize,
    concurrency: usize,
    fallbacks: AtomicU64,
}

impl EmbeddingEngine {
    /// Create an engine; `concurrency` bounds in-flight provider calls in
    /// [`EmbeddingEngine::embed_many`].
    pub fn new(provider: Arc<dyn EmbeddingProvider>, concurrency: usize) -> Self {
        Self {
            dimensions: provider.dimensions(),
            provider,
            concurrency: concurrency.max(1),
            fallbacks: AtomicU64::new(0),
        }
    }

    pub fn provider(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.provider
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Number of zero-vector substitutions made so far.
    pub fn fallback_count(&self) -> u64 {
        self.fallbacks.load(Ordering::Relaxed)
    }

    /// Embed one text, substituting a zero vector on failure.
    pub async fn embed(&self, text: &str) -> Embedding {
        match self.provider.embed(text).await {
            Ok(vector) if vector.len() == self.dimensions => Embedding {
                vector,
                degraded: false,
            },
            Ok(vector) => {
                tracing::warn!(
                    "Provider '{}' returned {} dimensions, expected {}; using zero vector",
                    self.provider.provider_name(),
                    vector.len(),
                    self.dimensions
                );
                self.fallback()
            }
            Err(e) => {
                tracing::warn!(
                    "Embedding failed for text of {} chars; using zero vector: {}",
                    text.chars().count(),
                    e
                );
                self.fallback()
            }
        }
    }

    /// Embed many texts concurrently; output order matches input order.
    pub async fn embed_many(&self, texts: &[String]) -> Vec<Embedding> {
        if texts.is_empty() {
            return Vec::new();
        }

        tracing::debug!(
            "Embedding {} texts with '{}' (model: {}, concurrency: {})",
            texts.len(),
            self.provider.provider_name(),
            self.provider.model_name(),
            self.concurrency
        );

        stream::iter(texts)
            .map(|text| self.embed(text))
            .buffered(self.concurrency)
            .collect()
            .await
    }

    fn fallback(&self) -> Embedding {
        self.fallbacks.fetch_add(1, Ordering::Relaxed);
        Embedding::zero(self.dimensions)
    }
}
