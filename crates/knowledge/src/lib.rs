//! Local document knowledge base.
//!
//! Loads documents, splits them into overlapping chunks, embeds every chunk
//! and keeps the vectors in a persistent SQLite collection that can be
//! queried by semantic similarity.

pub mod chunker;
pub mod config;
pub mod embeddings;
pub mod ingest;
pub mod loader;
pub mod metadata;
pub mod progress;
pub mod registry;
pub mod retrieval;
pub mod store;
pub mod types;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use chunker::{split_text, Chunk, ChunkConfig};
pub use embeddings::{create_provider, EmbeddingConfig, EmbeddingEngine, EmbeddingProvider};
pub use metadata::{Metadata, MetadataFilter, MetadataValue};
pub use progress::{ProgressEvent, ProgressReporter};
pub use store::VectorStore;
pub use types::{
    IngestReport, KnowledgeBaseConfig, KnowledgeBaseInfo, Record, RetrievalResult, SkippedFile,
};

use docrag_core::AppResult;
use ingest::Ingestor;
use retrieval::RetrievalEngine;
use std::path::PathBuf;
use std::sync::Arc;

/// A named collection bound to an embedding provider.
pub struct KnowledgeBase {
    config: KnowledgeBaseConfig,
    chunking: ChunkConfig,
    store: VectorStore,
    embeddings: EmbeddingEngine,
    progress: ProgressReporter,
}

impl KnowledgeBase {
    /// Open the collection described by `config`, embedding with `provider`.
    pub fn open(
        config: KnowledgeBaseConfig,
        provider: Arc<dyn EmbeddingProvider>,
    ) -> AppResult<Self> {
        config.validate()?;
        let chunking = config.chunk_config()?;

        let store = VectorStore::open(&config.persist_dir, &config.collection)?;

        if let Some(dimension) = store.dimension()? {
            if dimension != provider.dimensions() {
                tracing::warn!(
                    "Collection '{}' holds {}-dimensional vectors but provider '{}' produces {}; \
                     ingestion will fail until the collection is reset",
                    config.collection,
                    dimension,
                    provider.provider_name(),
                    provider.dimensions()
                );
            }
        }

        tracing::info!(
            "Opened knowledge base '{}' (provider: {}, model: {})",
            config.collection,
            provider.provider_name(),
            provider.model_name()
        );

        let embeddings = EmbeddingEngine::new(provider, config.embedding.concurrency);

        Ok(Self {
            config,
            chunking,
            store,
            embeddings,
            progress: ProgressReporter::noop(),
        })
    }

    /// Open the collection with the provider named in `config.embedding`.
    pub fn from_config(config: KnowledgeBaseConfig) -> AppResult<Self> {
        let provider = create_provider(&config.embedding)?;
        Self::open(config, provider)
    }

    /// Report ingestion progress through `progress`.
    pub fn with_progress(mut self, progress: ProgressReporter) -> Self {
        self.progress = progress;
        self
    }

    pub fn config(&self) -> &KnowledgeBaseConfig {
        &self.config
    }

    pub fn store(&self) -> &VectorStore {
        &self.store
    }

    pub fn embeddings(&self) -> &EmbeddingEngine {
        &self.embeddings
    }

    /// Ingest documents (or directories of documents) into the collection.
    pub async fn ingest(&mut self, paths: &[PathBuf]) -> AppResult<IngestReport> {
        self.ingest_with_metadata(paths, &Metadata::new()).await
    }

    /// Ingest documents, attaching `extra` to every chunk's metadata.
    ///
    /// Reserved keys in `extra` are ignored.
    pub async fn ingest_with_metadata(
        &mut self,
        paths: &[PathBuf],
        extra: &Metadata,
    ) -> AppResult<IngestReport> {
        Ingestor {
            store: &mut self.store,
            embeddings: &self.embeddings,
            chunking: self.chunking,
            progress: &self.progress,
        }
        .run(paths, extra)
        .await
    }

    /// Return up to `n_results` chunks most similar to `query`.
    pub async fn retrieve(
        &self,
        query: &str,
        n_results: usize,
        filter: Option<&MetadataFilter>,
    ) -> AppResult<Vec<RetrievalResult>> {
        RetrievalEngine::new(&self.embeddings, &self.store)
            .retrieve(query, n_results, filter)
            .await
    }

    /// Summarise the collection.
    pub fn info(&self) -> AppResult<KnowledgeBaseInfo> {
        registry::collect_info(&self.store)
    }

    /// Remove every record and forget the collection's dimensionality.
    pub fn reset_collection(&mut self) -> AppResult<()> {
        tracing::warn!(
            "Deleting all records of collection '{}'",
            self.config.collection
        );
        self.store.delete_collection()?;
        self.store.reset()
    }
}
