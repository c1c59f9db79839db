//! Error types for docrag.
//!
//! A single error enum covers every failure category of the retrieval
//! substrate: document loading, embedding, vector storage, configuration
//! and I/O.

use std::path::PathBuf;
use thiserror::Error;

/// Unified error type for docrag.
///
/// All fallible functions return `Result<T, AppError>`.
/// We never panic; errors are represented and propagated.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A document is missing, unreadable, or unparsable for its format
    #[error("Failed to load document {}: {message}", path.display())]
    Load { path: PathBuf, message: String },

    /// The embedding provider is unreachable or answered with garbage
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// A vector does not match the collection's dimensionality
    #[error("Dimension mismatch: collection expects {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// The named collection does not exist (or was deleted)
    #[error("Collection not found: {0}")]
    CollectionNotFound(String),

    /// A record failed validation before it reached the store
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// Persistence layer errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl AppError {
    /// Build a [`AppError::Load`] for `path`.
    pub fn load(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        AppError::Load {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_error_mentions_path() {
        let err = AppError::load("/tmp/missing.pdf", "No such file");
        let message = err.to_string();
        assert!(message.contains("/tmp/missing.pdf"));
        assert!(message.contains("No such file"));
    }

    #[test]
    fn test_dimension_mismatch_display() {
        let err = AppError::DimensionMismatch {
            expected: 768,
            actual: 384,
        };
        assert_eq!(
            err.to_string(),
            "Dimension mismatch: collection expects 768, got 384"
        );
    }

    #[test]
    fn test_from_serde_json() {
        let parse: Result<serde_json::Value, _> = serde_json::from_str("{not json");
        let err: AppError = parse.unwrap_err().into();
        assert!(matches!(err, AppError::Serialization(_)));
    }
}
