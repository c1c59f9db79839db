//! Knowledge system type definitions.

use crate::chunker::{ChunkConfig, DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};
use crate::embeddings::EmbeddingConfig;
use crate::metadata::Metadata;
use chrono::{DateTime, Utc};
use docrag_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for a knowledge base.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KnowledgeBaseConfig {
    /// Collection name
    #[serde(default = "default_collection")]
    pub collection: String,

    /// Directory holding the vector store database
    #[serde(default = "default_persist_dir")]
    pub persist_dir: PathBuf,

    /// Maximum chunk length in chars
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Overlap between consecutive chunks in chars
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    /// Embedding settings
    #[serde(default)]
    pub embedding: EmbeddingConfig,
}

fn default_collection() -> String {
    "docrag".to_string()
}

fn default_persist_dir() -> PathBuf {
    PathBuf::from(".docrag").join("store")
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

fn default_chunk_overlap() -> usize {
    DEFAULT_CHUNK_OVERLAP
}

impl Default for KnowledgeBaseConfig {
    fn default() -> Self {
        Self {
            collection: default_collection(),
            persist_dir: default_persist_dir(),
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            embedding: EmbeddingConfig::default(),
        }
    }
}

impl KnowledgeBaseConfig {
    /// Validated chunking parameters.
    pub fn chunk_config(&self) -> AppResult<ChunkConfig> {
        ChunkConfig::new(self.chunk_size, self.chunk_overlap)
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.collection.trim().is_empty() {
            return Err(AppError::Config(
                "Collection name must not be empty".to_string(),
            ));
        }
        self.chunk_config()?;
        self.embedding.validate()
    }
}

/// The atomic persisted unit of a collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Unique within the collection (`<file_name>_<chunk_index>` for ingested chunks)
    pub id: String,

    /// Embedding vector
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub vector: Vec<f32>,

    /// Chunk text
    pub text: String,

    /// Reserved and caller-supplied metadata
    pub metadata: Metadata,

    /// True when `vector` is the zero-vector fallback
    #[serde(default)]
    pub degraded: bool,
}

/// A record ranked against a query vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalResult {
    pub id: String,

    /// Full chunk text
    pub text: String,

    pub metadata: Metadata,

    /// Cosine distance to the query (lower is closer)
    pub distance: f32,

    /// True when the stored embedding is the zero-vector fallback
    pub degraded: bool,
}

/// A document that ingestion could not use.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Statistics from an ingest operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestReport {
    /// Documents loaded and stored (including those yielding no chunks)
    pub files_processed: usize,

    /// Records written (new or overwritten)
    pub chunks_added: usize,

    /// Documents skipped with the reason
    pub files_skipped: Vec<SkippedFile>,

    /// Chunks stored with a zero-vector fallback embedding
    pub degraded_chunks: usize,

    /// Duration in seconds
    pub duration_secs: f64,
}

/// Summary statistics for a collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeBaseInfo {
    /// Collection name
    pub collection: String,

    /// Record count
    pub total_chunks: usize,

    /// Distinct `source` values
    pub total_sources: usize,

    /// Sorted distinct `source` values
    pub sources: Vec<String>,

    /// Records stored with a zero-vector fallback embedding
    pub degraded_chunks: usize,

    /// Established vector dimensionality, if any record was ever stored
    pub dimension: Option<usize>,

    /// When the collection was created
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = KnowledgeBaseConfig::default();
        assert_eq!(config.collection, "docrag");
        assert_eq!(config.chunk_size, 1000);
        assert_eq!(config.chunk_overlap, 200);
        assert_eq!(config.embedding.model, "nomic-embed-text");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_chunking() {
        let config = KnowledgeBaseConfig {
            chunk_size: 100,
            chunk_overlap: 150,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(AppError::Config(_))));
    }

    #[test]
    fn test_config_yaml_defaults() {
        let config: KnowledgeBaseConfig =
            serde_yaml::from_str("collection: biology\nchunk_size: 500\n").unwrap();
        assert_eq!(config.collection, "biology");
        assert_eq!(config.chunk_size, 500);
        assert_eq!(config.chunk_overlap, 200);
        assert_eq!(config.embedding.provider, "ollama");
    }
}
