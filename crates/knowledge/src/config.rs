//! Knowledge base configuration management.
//!
//! Per-collection settings live at
//! `<workspace>/.docrag/collections/<name>/config.yaml`.

use crate::types::KnowledgeBaseConfig;
use docrag_core::{AppError, AppResult};
use std::fs;
use std::path::{Path, PathBuf};

/// Load a collection's configuration.
///
/// Falls back to defaults when no config file exists. A relative
/// `persist_dir` is resolved against the workspace.
pub fn load_config(workspace: &Path, collection: &str) -> AppResult<KnowledgeBaseConfig> {
    let config_path = get_config_path(workspace, collection);

    let mut config = if config_path.exists() {
        let content = fs::read_to_string(&config_path).map_err(|e| {
            AppError::Config(format!("Failed to read config at {:?}: {}", config_path, e))
        })?;

        let config: KnowledgeBaseConfig = serde_yaml::from_str(&content).map_err(|e| {
            AppError::Config(format!("Failed to parse config at {:?}: {}", config_path, e))
        })?;

        tracing::debug!("Loaded knowledge base config for '{}'", collection);
        config
    } else {
        tracing::debug!(
            "Using default knowledge base config for '{}' (no config file found)",
            collection
        );
        KnowledgeBaseConfig::default()
    };

    // The directory name wins over whatever the file says
    config.collection = collection.to_string();
    if config.persist_dir.is_relative() {
        config.persist_dir = workspace.join(&config.persist_dir);
    }

    Ok(config)
}

/// Save a collection's configuration.
pub fn save_config(workspace: &Path, config: &KnowledgeBaseConfig) -> AppResult<()> {
    let config_path = get_config_path(workspace, &config.collection);

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            AppError::Config(format!("Failed to create config directory: {}", e))
        })?;
    }

    let yaml = serde_yaml::to_string(config)?;

    fs::write(&config_path, yaml).map_err(|e| {
        AppError::Config(format!("Failed to write config to {:?}: {}", config_path, e))
    })?;

    tracing::debug!("Saved knowledge base config for '{}'", config.collection);
    Ok(())
}

/// Get the directory holding a collection's settings.
pub fn get_collection_dir(workspace: &Path, collection: &str) -> PathBuf {
    workspace
        .join(".docrag")
        .join("collections")
        .join(collection)
}

/// Get the path to a collection's config file.
pub fn get_config_path(workspace: &Path, collection: &str) -> PathBuf {
    get_collection_dir(workspace, collection).join("config.yaml")
}
