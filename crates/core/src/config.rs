//! Application configuration for docrag.
//!
//! Configuration is assembled by the binary from, in increasing precedence:
//! - Built-in defaults
//! - A YAML config file (`.docrag/config.yaml` or `DOCRAG_CONFIG`)
//! - Environment variables
//! - Command-line flags
//!
//! The knowledge crate never reads any of this itself; the binary turns an
//! `AppConfig` into an explicit knowledge base configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Embedding providers the knowledge crate knows how to build.
pub const KNOWN_PROVIDERS: [&str; 2] = ["ollama", "trigram"];

/// Main application configuration.
///
/// Values left as `None` fall through to the per-collection configuration
/// stored next to the collection (or to its defaults).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .docrag/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Collection (knowledge base) name
    pub collection: String,

    /// Directory scanned for documents when no paths are given
    pub data_dir: PathBuf,

    /// Where collections are persisted
    pub persist_dir: Option<PathBuf>,

    /// Maximum chunk length in characters
    pub chunk_size: Option<usize>,

    /// Characters shared between consecutive chunks
    pub chunk_overlap: Option<usize>,

    /// Embedding provider ("ollama", "trigram")
    pub embedding_provider: Option<String>,

    /// Embedding model identifier
    pub embedding_model: Option<String>,

    /// Embedding endpoint base URL
    pub embedding_endpoint: Option<String>,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    collection: Option<String>,
    data_dir: Option<PathBuf>,
    persist_dir: Option<PathBuf>,
    chunking: Option<ChunkingSection>,
    embedding: Option<EmbeddingSection>,
    logging: Option<LoggingSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChunkingSection {
    size: Option<usize>,
    overlap: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct EmbeddingSection {
    provider: Option<String>,
    model: Option<String>,
    endpoint: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingSection {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let workspace = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self {
            data_dir: workspace.join("data"),
            workspace,
            config_file: None,
            collection: "docrag".to_string(),
            persist_dir: None,
            chunk_size: None,
            chunk_overlap: None,
            embedding_provider: None,
            embedding_model: None,
            embedding_endpoint: None,
            log_level: None,
            verbose: false,
            no_color: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, the YAML file and the environment.
    ///
    /// Environment variables:
    /// - `DOCRAG_WORKSPACE`: Override workspace path
    /// - `DOCRAG_CONFIG`: Path to config file
    /// - `DOCRAG_COLLECTION`: Collection name
    /// - `DOCRAG_DATA_DIR`: Document directory
    /// - `DOCRAG_PERSIST_DIR`: Collection storage directory
    /// - `DOCRAG_CHUNK_SIZE` / `DOCRAG_CHUNK_OVERLAP`: Chunking parameters
    /// - `DOCRAG_EMBEDDING_PROVIDER` / `DOCRAG_EMBEDDING_MODEL`: Embedding selection
    /// - `OLLAMA_BASE_URL`: Embedding endpoint
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use docrag_core::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load config");
    /// println!("Collection: {}", config.collection);
    /// ```
    pub fn load() -> AppResult<Self> {
        Self::load_from(None, None)
    }

    /// Like [`AppConfig::load`], with the workspace and config file chosen on
    /// the command line. Both take precedence over `DOCRAG_WORKSPACE` and
    /// `DOCRAG_CONFIG`, and decide which YAML file is merged.
    pub fn load_from(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        let workspace =
            workspace.or_else(|| std::env::var_os("DOCRAG_WORKSPACE").map(PathBuf::from));
        if let Some(workspace) = workspace {
            config.data_dir = workspace.join("data");
            config.workspace = workspace;
        }

        config.config_file =
            config_file.or_else(|| std::env::var_os("DOCRAG_CONFIG").map(PathBuf::from));

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        match config.config_file.clone() {
            // An explicitly chosen file must exist
            Some(path) => {
                if !path.exists() {
                    return Err(AppError::Config(format!(
                        "Config file does not exist: {:?}",
                        path
                    )));
                }
                config = config.merge_yaml(&path)?;
            }
            None => {
                let path = config.docrag_dir().join("config.yaml");
                if path.exists() {
                    config = config.merge_yaml(&path)?;
                }
            }
        }

        // Environment variables override YAML config
        if let Ok(collection) = std::env::var("DOCRAG_COLLECTION") {
            config.collection = collection;
        }
        if let Ok(data_dir) = std::env::var("DOCRAG_DATA_DIR") {
            config.data_dir = PathBuf::from(data_dir);
        }
        if let Ok(persist_dir) = std::env::var("DOCRAG_PERSIST_DIR") {
            config.persist_dir = Some(PathBuf::from(persist_dir));
        }
        if let Some(size) = env_usize("DOCRAG_CHUNK_SIZE")? {
            config.chunk_size = Some(size);
        }
        if let Some(overlap) = env_usize("DOCRAG_CHUNK_OVERLAP")? {
            config.chunk_overlap = Some(overlap);
        }
        if let Ok(provider) = std::env::var("DOCRAG_EMBEDDING_PROVIDER") {
            config.embedding_provider = Some(provider);
        }
        if let Ok(model) = std::env::var("DOCRAG_EMBEDDING_MODEL") {
            config.embedding_model = Some(model);
        }
        if let Ok(endpoint) = std::env::var("OLLAMA_BASE_URL") {
            config.embedding_endpoint = Some(endpoint);
        }

        if let Ok(level) = std::env::var("RUST_LOG") {
            config.log_level = Some(level);
        }

        if std::env::var_os("NO_COLOR").is_some() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge a YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(collection) = file.collection {
            result.collection = collection;
        }
        if let Some(data_dir) = file.data_dir {
            result.data_dir = result.resolve(data_dir);
        }
        if let Some(persist_dir) = file.persist_dir {
            result.persist_dir = Some(result.resolve(persist_dir));
        }

        if let Some(chunking) = file.chunking {
            result.chunk_size = chunking.size.or(result.chunk_size);
            result.chunk_overlap = chunking.overlap.or(result.chunk_overlap);
        }

        if let Some(embedding) = file.embedding {
            result.embedding_provider = embedding.provider.or(result.embedding_provider);
            result.embedding_model = embedding.model.or(result.embedding_model);
            result.embedding_endpoint = embedding.endpoint.or(result.embedding_endpoint);
        }

        if let Some(logging) = file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// Command-line flags take precedence over environment variables and
    /// the config file. The workspace and config file flags go through
    /// [`AppConfig::load_from`] instead.
    pub fn with_overrides(
        mut self,
        collection: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(collection) = collection {
            self.collection = collection;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Get the path to the .docrag directory.
    pub fn docrag_dir(&self) -> PathBuf {
        self.workspace.join(".docrag")
    }

    /// Ensure the .docrag directory exists.
    pub fn ensure_docrag_dir(&self) -> AppResult<()> {
        let dir = self.docrag_dir();
        if !dir.exists() {
            std::fs::create_dir_all(&dir).map_err(|e| {
                AppError::Config(format!("Failed to create .docrag directory: {}", e))
            })?;
        }
        Ok(())
    }

    /// Validate the assembled configuration.
    pub fn validate(&self) -> AppResult<()> {
        if self.collection.trim().is_empty() {
            return Err(AppError::Config("Collection name must not be empty".to_string()));
        }

        if let Some(provider) = &self.embedding_provider {
            if !KNOWN_PROVIDERS.contains(&provider.as_str()) {
                return Err(AppError::Config(format!(
                    "Unknown embedding provider: {}. Supported: {}",
                    provider,
                    KNOWN_PROVIDERS.join(", ")
                )));
            }
        }

        if let Some(size) = self.chunk_size {
            if size == 0 {
                return Err(AppError::Config("Chunk size must be positive".to_string()));
            }
            if let Some(overlap) = self.chunk_overlap {
                if overlap >= size {
                    return Err(AppError::Config(format!(
                        "Chunk overlap ({}) must be smaller than chunk size ({})",
                        overlap, size
                    )));
                }
            }
        }

        Ok(())
    }

    fn resolve(&self, path: PathBuf) -> PathBuf {
        if path.is_absolute() {
            path
        } else {
            self.workspace.join(path)
        }
    }
}

fn env_usize(name: &str) -> AppResult<Option<usize>> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<usize>()
            .map(Some)
            .map_err(|e| AppError::Config(format!("Invalid value for {}: {} ({})", name, raw, e))),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.collection, "docrag");
        assert!(config.data_dir.ends_with("data"));
        assert!(config.embedding_provider.is_none());
        assert!(!config.verbose);
        assert!(!config.no_color);
    }

    #[test]
    fn test_docrag_dir() {
        let config = AppConfig::default();
        assert!(config.docrag_dir().ends_with(".docrag"));
    }

    #[test]
    fn test_with_overrides() {
        let config = AppConfig::default();
        let overridden = config.with_overrides(Some("papers".to_string()), None, true, false);

        assert_eq!(overridden.collection, "papers");
        assert!(overridden.verbose);
        assert_eq!(overridden.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_load_from_merges_given_config_file() {
        let temp = TempDir::new().unwrap();
        let custom = temp.path().join("custom.yaml");
        std::fs::write(&custom, "collection: from_flag\nchunking:\n  size: 321\n").unwrap();

        let config =
            AppConfig::load_from(Some(temp.path().to_path_buf()), Some(custom.clone())).unwrap();

        assert_eq!(config.collection, "from_flag");
        assert_eq!(config.chunk_size, Some(321));
        assert_eq!(config.config_file, Some(custom));
        assert_eq!(config.workspace, temp.path());
        assert_eq!(config.data_dir, temp.path().join("data"));
    }

    #[test]
    fn test_load_from_reads_workspace_config() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join(".docrag")).unwrap();
        std::fs::write(
            temp.path().join(".docrag").join("config.yaml"),
            "collection: lectures\ndata_dir: docs\n",
        )
        .unwrap();

        let config = AppConfig::load_from(Some(temp.path().to_path_buf()), None).unwrap();

        assert_eq!(config.collection, "lectures");
        assert_eq!(config.data_dir, temp.path().join("docs"));
    }

    #[test]
    fn test_load_from_missing_config_file_fails() {
        let temp = TempDir::new().unwrap();
        let result = AppConfig::load_from(
            Some(temp.path().to_path_buf()),
            Some(temp.path().join("absent.yaml")),
        );
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_load_from_missing_workspace_fails() {
        let temp = TempDir::new().unwrap();
        let result = AppConfig::load_from(Some(temp.path().join("absent")), None);
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_merge_yaml() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        std::fs::write(
            &path,
            r#"
collection: lectures
data_dir: docs
chunking:
  size: 500
  overlap: 100
embedding:
  provider: trigram
logging:
  color: false
"#,
        )
        .unwrap();

        let base = AppConfig {
            workspace: temp.path().to_path_buf(),
            ..AppConfig::default()
        };
        let merged = base.merge_yaml(&path).unwrap();

        assert_eq!(merged.collection, "lectures");
        assert_eq!(merged.data_dir, temp.path().join("docs"));
        assert_eq!(merged.chunk_size, Some(500));
        assert_eq!(merged.chunk_overlap, Some(100));
        assert_eq!(merged.embedding_provider.as_deref(), Some("trigram"));
        assert!(merged.embedding_model.is_none());
        assert!(merged.no_color);
        assert!(merged.validate().is_ok());
    }

    #[test]
    fn test_merge_yaml_rejects_garbage() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        std::fs::write(&path, "chunking: [1, 2").unwrap();

        let result = AppConfig::default().merge_yaml(&path);
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_validate_unknown_provider() {
        let config = AppConfig {
            embedding_provider: Some("unknown".to_string()),
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_overlap_not_smaller_than_size() {
        let config = AppConfig {
            chunk_size: Some(100),
            chunk_overlap: Some(100),
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
