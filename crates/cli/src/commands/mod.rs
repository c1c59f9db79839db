//! Command handlers for the docrag CLI.
//!
//! This module organizes all CLI commands into separate submodules.

pub mod info;
pub mod ingest;
pub mod query;
pub mod reset;

// Re-export command types for convenience
pub use info::InfoCommand;
pub use ingest::IngestCommand;
pub use query::QueryCommand;
pub use reset::ResetCommand;

use docrag_core::{config::AppConfig, AppError, AppResult};
use docrag_knowledge::{config as kb_config, EmbeddingConfig, KnowledgeBase, KnowledgeBaseConfig};

/// Dimensionality used when the trigram provider is selected without a
/// collection config that pins one.
const TRIGRAM_DIMENSIONS: usize = 384;

/// Collection settings: the collection's own config file, then the
/// application-level overrides.
pub fn knowledge_base_config(config: &AppConfig) -> AppResult<KnowledgeBaseConfig> {
    let mut kb = kb_config::load_config(&config.workspace, &config.collection)?;

    if let Some(persist_dir) = &config.persist_dir {
        kb.persist_dir = persist_dir.clone();
    }
    if let Some(size) = config.chunk_size {
        kb.chunk_size = size;
    }
    if let Some(overlap) = config.chunk_overlap {
        kb.chunk_overlap = overlap;
    }

    if let Some(provider) = &config.embedding_provider {
        if provider != &kb.embedding.provider {
            kb.embedding = match provider.as_str() {
                "trigram" => EmbeddingConfig::trigram(TRIGRAM_DIMENSIONS),
                _ => EmbeddingConfig {
                    provider: provider.clone(),
                    ..EmbeddingConfig::default()
                },
            };
        }
    }
    if let Some(model) = &config.embedding_model {
        kb.embedding.model = model.clone();
    }
    if let Some(endpoint) = &config.embedding_endpoint {
        kb.embedding.endpoint = endpoint.clone();
    }

    kb.validate()?;
    Ok(kb)
}

/// Open the configured collection.
pub fn open_knowledge_base(config: &AppConfig) -> AppResult<KnowledgeBase> {
    KnowledgeBase::from_config(knowledge_base_config(config)?)
}

/// Pretty-print a JSON value to stdout.
pub fn print_json(value: &serde_json::Value) -> AppResult<()> {
    let output = serde_json::to_string_pretty(value)
        .map_err(|e| AppError::Serialization(format!("JSON serialization failed: {}", e)))?;
    println!("{}", output);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn app_config(workspace: &TempDir) -> AppConfig {
        AppConfig {
            workspace: workspace.path().to_path_buf(),
            data_dir: workspace.path().join("data"),
            collection: "notes".to_string(),
            ..AppConfig::default()
        }
    }

    #[test]
    fn test_defaults_resolve_under_workspace() {
        let temp = TempDir::new().unwrap();
        let kb = knowledge_base_config(&app_config(&temp)).unwrap();

        assert_eq!(kb.collection, "notes");
        assert!(kb.persist_dir.starts_with(temp.path()));
        assert_eq!(kb.embedding.provider, "ollama");
    }

    #[test]
    fn test_overrides_apply() {
        let temp = TempDir::new().unwrap();
        let mut config = app_config(&temp);
        config.chunk_size = Some(300);
        config.chunk_overlap = Some(30);
        config.embedding_provider = Some("trigram".to_string());
        config.persist_dir = Some(temp.path().join("vectors"));

        let kb = knowledge_base_config(&config).unwrap();
        assert_eq!(kb.chunk_size, 300);
        assert_eq!(kb.chunk_overlap, 30);
        assert_eq!(kb.embedding.provider, "trigram");
        assert_eq!(kb.embedding.dimensions, TRIGRAM_DIMENSIONS);
        assert_eq!(kb.persist_dir, temp.path().join("vectors"));
    }

    #[test]
    fn test_invalid_chunking_is_rejected() {
        let temp = TempDir::new().unwrap();
        let mut config = app_config(&temp);
        config.chunk_size = Some(100);
        config.chunk_overlap = Some(100);

        assert!(knowledge_base_config(&config).is_err());
    }
}
