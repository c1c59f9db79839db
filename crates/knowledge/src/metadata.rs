//! Typed record metadata and exact-match filters.
//!
//! Metadata is an open string-to-scalar mapping. Ingestion always populates
//! the reserved keys [`SOURCE_KEY`], [`CHUNK_INDEX_KEY`] and
//! [`FILE_NAME_KEY`]; everything else is caller-supplied.

use docrag_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Originating document identifier (the path the document was loaded from).
pub const SOURCE_KEY: &str = "source";

/// Ordinal of the chunk within its source document.
pub const CHUNK_INDEX_KEY: &str = "chunk_index";

/// Base name of the originating file.
pub const FILE_NAME_KEY: &str = "file_name";

/// Keys owned by ingestion; caller metadata can never replace them.
pub const RESERVED_KEYS: [&str; 3] = [SOURCE_KEY, CHUNK_INDEX_KEY, FILE_NAME_KEY];

/// A scalar metadata value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl MetadataValue {
    /// Parse a command-line value, recognising booleans, integers and floats.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "true" => return Self::Bool(true),
            "false" => return Self::Bool(false),
            _ => {}
        }

        if let Ok(value) = raw.parse::<i64>() {
            return Self::Integer(value);
        }

        // f64 also accepts "inf" and "NaN", which are almost certainly meant as text
        if raw.chars().any(|c| c.is_ascii_digit()) {
            if let Ok(value) = raw.parse::<f64>() {
                if value.is_finite() {
                    return Self::Float(value);
                }
            }
        }

        Self::String(raw.to_string())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{}", b),
            Self::Integer(i) => write!(f, "{}", i),
            Self::Float(x) => write!(f, "{}", x),
            Self::String(s) => f.write_str(s),
        }
    }
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for MetadataValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for MetadataValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for MetadataValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Ordered metadata mapping attached to every record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata(BTreeMap<String, MetadataValue>);

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Metadata for one chunk of a source document, with all reserved keys set.
    pub fn for_chunk(source: &str, chunk_index: usize, file_name: &str) -> Self {
        let mut map = BTreeMap::new();
        map.insert(SOURCE_KEY.to_string(), MetadataValue::from(source));
        map.insert(
            CHUNK_INDEX_KEY.to_string(),
            MetadataValue::Integer(chunk_index as i64),
        );
        map.insert(FILE_NAME_KEY.to_string(), MetadataValue::from(file_name));
        Self(map)
    }

    /// Merge caller-supplied metadata. Reserved keys are left untouched.
    pub fn with_extra(mut self, extra: &Metadata) -> Self {
        for (key, value) in extra.iter() {
            if RESERVED_KEYS.contains(&key.as_str()) {
                tracing::warn!("Ignoring caller metadata for reserved key '{}'", key);
                continue;
            }
            self.0.insert(key.clone(), value.clone());
        }
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<MetadataValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&MetadataValue> {
        self.0.get(key)
    }

    pub fn source(&self) -> Option<&str> {
        self.get(SOURCE_KEY).and_then(MetadataValue::as_str)
    }

    pub fn chunk_index(&self) -> Option<i64> {
        self.get(CHUNK_INDEX_KEY).and_then(MetadataValue::as_i64)
    }

    pub fn file_name(&self) -> Option<&str> {
        self.get(FILE_NAME_KEY).and_then(MetadataValue::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &MetadataValue)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Check that every reserved key is present with the expected type.
    pub fn validate(&self) -> AppResult<()> {
        if self.source().is_none() {
            return Err(AppError::InvalidRecord(format!(
                "metadata key '{}' must be a string",
                SOURCE_KEY
            )));
        }
        match self.chunk_index() {
            Some(index) if index >= 0 => {}
            _ => {
                return Err(AppError::InvalidRecord(format!(
                    "metadata key '{}' must be a non-negative integer",
                    CHUNK_INDEX_KEY
                )))
            }
        }
        if self.file_name().is_none() {
            return Err(AppError::InvalidRecord(format!(
                "metadata key '{}' must be a string",
                FILE_NAME_KEY
            )));
        }
        Ok(())
    }
}

impl FromIterator<(String, MetadataValue)> for Metadata {
    fn from_iter<T: IntoIterator<Item = (String, MetadataValue)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Exact-match conjunction over metadata keys.
///
/// A record matches when every filter key is present with an equal value.
/// The empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataFilter {
    conditions: BTreeMap<String, MetadataValue>,
}

impl MetadataFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a condition (builder style).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<MetadataValue>) -> Self {
        self.conditions.insert(key.into(), value.into());
        self
    }

    /// Build a filter from `key=value` strings.
    pub fn from_pairs<S: AsRef<str>>(pairs: &[S]) -> AppResult<Self> {
        let mut filter = Self::new();
        for pair in pairs {
            let (key, value) = Self::parse_pair(pair.as_ref())?;
            filter.conditions.insert(key, value);
        }
        Ok(filter)
    }

    /// Parse a single `key=value` condition.
    pub fn parse_pair(pair: &str) -> AppResult<(String, MetadataValue)> {
        let (key, value) = pair.split_once('=').ok_or_else(|| {
            AppError::Config(format!("Invalid filter '{}': expected key=value", pair))
        })?;

        let key = key.trim();
        if key.is_empty() {
            return Err(AppError::Config(format!(
                "Invalid filter '{}': key must not be empty",
                pair
            )));
        }

        Ok((key.to_string(), MetadataValue::parse(value.trim())))
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn matches(&self, metadata: &Metadata) -> bool {
        self.conditions
            .iter()
            .all(|(key, expected)| metadata.get(key) == Some(expected))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_chunk_populates_reserved_keys() {
        let metadata = Metadata::for_chunk("/data/notes.txt", 3, "notes.txt");
        assert_eq!(metadata.source(), Some("/data/notes.txt"));
        assert_eq!(metadata.chunk_index(), Some(3));
        assert_eq!(metadata.file_name(), Some("notes.txt"));
        assert!(metadata.validate().is_ok());
    }

    #[test]
    fn test_with_extra_never_overrides_reserved() {
        let mut extra = Metadata::new();
        extra.insert("source", "spoofed.pdf");
        extra.insert("course", "biology");

        let metadata = Metadata::for_chunk("a.pdf", 0, "a.pdf").with_extra(&extra);
        assert_eq!(metadata.source(), Some("a.pdf"));
        assert_eq!(
            metadata.get("course"),
            Some(&MetadataValue::String("biology".to_string()))
        );
    }

    #[test]
    fn test_validate_rejects_missing_keys() {
        let mut metadata = Metadata::new();
        metadata.insert("source", "a.pdf");
        metadata.insert("chunk_index", "zero");
        assert!(matches!(
            metadata.validate(),
            Err(AppError::InvalidRecord(_))
        ));
    }

    #[test]
    fn test_serde_keeps_scalar_types() {
        let mut metadata = Metadata::for_chunk("a.md", 7, "a.md");
        metadata.insert("weight", 0.5);
        metadata.insert("draft", true);

        let json = serde_json::to_string(&metadata).unwrap();
        let back: Metadata = serde_json::from_str(&json).unwrap();

        assert_eq!(back, metadata);
        assert_eq!(back.chunk_index(), Some(7));
    }

    #[test]
    fn test_parse_value() {
        assert_eq!(MetadataValue::parse("42"), MetadataValue::Integer(42));
        assert_eq!(MetadataValue::parse("1.5"), MetadataValue::Float(1.5));
        assert_eq!(MetadataValue::parse("true"), MetadataValue::Bool(true));
        assert_eq!(
            MetadataValue::parse("doc1.pdf"),
            MetadataValue::String("doc1.pdf".to_string())
        );
        assert_eq!(
            MetadataValue::parse("inf"),
            MetadataValue::String("inf".to_string())
        );
    }

    #[test]
    fn test_filter_matching() {
        let metadata = Metadata::for_chunk("doc1.pdf", 2, "doc1.pdf");

        assert!(MetadataFilter::new().matches(&metadata));
        assert!(MetadataFilter::new()
            .with("source", "doc1.pdf")
            .matches(&metadata));
        assert!(MetadataFilter::new()
            .with("source", "doc1.pdf")
            .with("chunk_index", 2i64)
            .matches(&metadata));
        assert!(!MetadataFilter::new()
            .with("source", "doc2.pdf")
            .matches(&metadata));
        assert!(!MetadataFilter::new()
            .with("missing", "x")
            .matches(&metadata));
    }

    #[test]
    fn test_parse_pairs() {
        let filter = MetadataFilter::from_pairs(&["source=doc1.pdf", "chunk_index = 0"]).unwrap();
        let metadata = Metadata::for_chunk("doc1.pdf", 0, "doc1.pdf");
        assert!(filter.matches(&metadata));

        assert!(MetadataFilter::parse_pair("no-equals").is_err());
        assert!(MetadataFilter::parse_pair("=value").is_err());
    }
}
