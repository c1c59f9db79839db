//! SQLite-backed vector store.
//!
//! One database file holds any number of named collections. Similarity
//! search is an exact brute-force cosine scan, which is fine at the scale of
//! a few thousand chunks.

use crate::metadata::{Metadata, MetadataFilter};
use crate::types::{Record, RetrievalResult};
use chrono::{DateTime, Utc};
use docrag_core::{AppError, AppResult};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};

/// Database file name inside the persistence directory.
pub const DB_FILE: &str = "docrag.sqlite";

/// A persistent, named collection of records.
#[derive(Debug)]
pub struct VectorStore {
    conn: Connection,
    name: String,
    db_path: PathBuf,
}

/// Collection row as stored in the `collections` table.
struct CollectionRow {
    dimension: Option<usize>,
    created_at: DateTime<Utc>,
}

impl VectorStore {
    /// Open (or create) the collection `name` under `persist_dir`.
    pub fn open(persist_dir: &Path, name: &str) -> AppResult<Self> {
        std::fs::create_dir_all(persist_dir).map_err(|e| {
            AppError::Storage(format!(
                "Failed to create store directory {:?}: {}",
                persist_dir, e
            ))
        })?;

        let db_path = persist_dir.join(DB_FILE);
        let conn = Connection::open(&db_path)
            .map_err(|e| AppError::Storage(format!("Failed to open SQLite store: {}", e)))?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS collections (
                name TEXT PRIMARY KEY,
                dimension INTEGER,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS records (
                collection TEXT NOT NULL,
                id TEXT NOT NULL,
                seq INTEGER NOT NULL,
                text TEXT NOT NULL,
                embedding BLOB NOT NULL,
                metadata TEXT NOT NULL,
                degraded INTEGER NOT NULL DEFAULT 0,
                PRIMARY KEY (collection, id)
            );

            CREATE INDEX IF NOT EXISTS idx_records_seq ON records(collection, seq);
            "#,
        )
        .map_err(|e| AppError::Storage(format!("Failed to create tables: {}", e)))?;

        let store = Self {
            conn,
            name: name.to_string(),
            db_path,
        };
        store.create_collection(None)?;

        tracing::debug!("Opened collection '{}' at {:?}", name, store.db_path);
        Ok(store)
    }

    /// Collection name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path of the backing database file.
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Established dimensionality; `None` until the first non-empty upsert.
    pub fn dimension(&self) -> AppResult<Option<usize>> {
        Ok(self.collection_row()?.dimension)
    }

    /// When the collection was (re)created.
    pub fn created_at(&self) -> AppResult<DateTime<Utc>> {
        Ok(self.collection_row()?.created_at)
    }

    /// Insert or overwrite records by id.
    ///
    /// All-or-nothing: any vector whose length differs from the collection's
    /// dimensionality fails the whole batch with `DimensionMismatch`.
    /// Overwritten records keep their original insertion order.
    pub fn upsert(&mut self, records: &[Record]) -> AppResult<usize> {
        let row = self.collection_row()?;
        if records.is_empty() {
            return Ok(0);
        }

        let expected = match row.dimension {
            Some(dimension) => dimension,
            None => records[0].vector.len(),
        };

        for record in records {
            if record.id.is_empty() {
                return Err(AppError::InvalidRecord(
                    "record id must not be empty".to_string(),
                ));
            }
            if record.vector.is_empty() {
                return Err(AppError::InvalidRecord(format!(
                    "record '{}' has an empty vector",
                    record.id
                )));
            }
            if record.vector.len() != expected {
                return Err(AppError::DimensionMismatch {
                    expected,
                    actual: record.vector.len(),
                });
            }
        }

        let tx = self
            .conn
            .transaction()
            .map_err(|e| AppError::Storage(format!("Failed to begin transaction: {}", e)))?;

        if row.dimension.is_none() {
            tx.execute(
                "UPDATE collections SET dimension = ?1 WHERE name = ?2",
                params![expected as i64, self.name],
            )
            .map_err(|e| AppError::Storage(format!("Failed to set dimension: {}", e)))?;
        }

        let mut next_seq: i64 = tx
            .query_row(
                "SELECT COALESCE(MAX(seq), -1) + 1 FROM records WHERE collection = ?1",
                params![self.name],
                |row| row.get(0),
            )
            .map_err(|e| AppError::Storage(format!("Failed to read sequence: {}", e)))?;

        {
            let mut stmt = tx
                .prepare(
                    "INSERT INTO records (collection, id, seq, text, embedding, metadata, degraded)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                     ON CONFLICT(collection, id) DO UPDATE SET
                         text = excluded.text,
                         embedding = excluded.embedding,
                         metadata = excluded.metadata,
                         degraded = excluded.degraded",
                )
                .map_err(|e| AppError::Storage(format!("Failed to prepare upsert: {}", e)))?;

            for record in records {
                let metadata_json = serde_json::to_string(&record.metadata)?;
                stmt.execute(params![
                    self.name,
                    record.id,
                    next_seq,
                    record.text,
                    embedding_to_bytes(&record.vector),
                    metadata_json,
                    record.degraded,
                ])
                .map_err(|e| {
                    AppError::Storage(format!("Failed to upsert record '{}': {}", record.id, e))
                })?;
                next_seq += 1;
            }
        }

        tx.commit()
            .map_err(|e| AppError::Storage(format!("Failed to commit upsert: {}", e)))?;

        tracing::debug!(
            "Upserted {} records into collection '{}'",
            records.len(),
            self.name
        );
        Ok(records.len())
    }

    /// Up to `k` records nearest to `vector` under cosine distance.
    ///
    /// Ties keep insertion order. `k == 0` returns nothing.
    pub fn query(
        &self,
        vector: &[f32],
        k: usize,
        filter: Option<&MetadataFilter>,
    ) -> AppResult<Vec<RetrievalResult>> {
        let row = self.collection_row()?;
        let dimension = match row.dimension {
            Some(dimension) => dimension,
            None => return Ok(Vec::new()),
        };
        if vector.len() != dimension {
            return Err(AppError::DimensionMismatch {
                expected: dimension,
                actual: vector.len(),
            });
        }
        if k == 0 {
            return Ok(Vec::new());
        }

        let mut results: Vec<RetrievalResult> = self
            .scan()?
            .into_iter()
            .filter(|record| filter.map_or(true, |f| f.matches(&record.metadata)))
            .map(|record| RetrievalResult {
                distance: cosine_distance(vector, &record.vector),
                id: record.id,
                text: record.text,
                metadata: record.metadata,
                degraded: record.degraded,
            })
            .collect();

        // Stable sort keeps scan (insertion) order among equal distances
        results.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        results.truncate(k);

        tracing::debug!(
            "Query on '{}' returned {} results (requested top-{})",
            self.name,
            results.len(),
            k
        );
        Ok(results)
    }

    /// Fetch one record by id.
    pub fn get(&self, id: &str) -> AppResult<Option<Record>> {
        self.collection_row()?;
        self.conn
            .query_row(
                "SELECT id, text, embedding, metadata, degraded FROM records
                 WHERE collection = ?1 AND id = ?2",
                params![self.name, id],
                record_from_row,
            )
            .optional()
            .map_err(|e| AppError::Storage(format!("Failed to read record '{}': {}", id, e)))
    }

    /// Every record, in insertion order.
    pub fn get_all(&self) -> AppResult<Vec<Record>> {
        self.collection_row()?;
        self.scan()
    }

    /// Current record count.
    pub fn count(&self) -> AppResult<usize> {
        self.collection_row()?;
        let count: i64 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM records WHERE collection = ?1",
                params![self.name],
                |row| row.get(0),
            )
            .map_err(|e| AppError::Storage(format!("Failed to count records: {}", e)))?;
        Ok(count as usize)
    }

    /// Delete records by id; returns how many existed.
    pub fn delete(&mut self, ids: &[String]) -> AppResult<usize> {
        self.collection_row()?;

        let tx = self
            .conn
            .transaction()
            .map_err(|e| AppError::Storage(format!("Failed to begin transaction: {}", e)))?;
        let mut deleted = 0;
        for id in ids {
            deleted += tx
                .execute(
                    "DELETE FROM records WHERE collection = ?1 AND id = ?2",
                    params![self.name, id],
                )
                .map_err(|e| {
                    AppError::Storage(format!("Failed to delete record '{}': {}", id, e))
                })?;
        }
        tx.commit()
            .map_err(|e| AppError::Storage(format!("Failed to commit delete: {}", e)))?;

        Ok(deleted)
    }

    /// Delete the chunks of `source` whose index is `keep` or higher.
    ///
    /// Used after re-ingesting a document that now yields fewer chunks.
    pub fn delete_source_chunks_from(&mut self, source: &str, keep: usize) -> AppResult<usize> {
        self.collection_row()?;
        let deleted = self
            .conn
            .execute(
                "DELETE FROM records
                 WHERE collection = ?1
                   AND json_extract(metadata, '$.source') = ?2
                   AND json_extract(metadata, '$.chunk_index') >= ?3",
                params![self.name, source, keep as i64],
            )
            .map_err(|e| AppError::Storage(format!("Failed to prune stale chunks: {}", e)))?;

        if deleted > 0 {
            tracing::debug!(
                "Removed {} stale chunks of {} from '{}'",
                deleted,
                source,
                self.name
            );
        }
        Ok(deleted)
    }

    /// Destroy the collection and all its records.
    ///
    /// Afterwards every operation except [`VectorStore::reset`] fails with
    /// `CollectionNotFound`.
    pub fn delete_collection(&mut self) -> AppResult<()> {
        self.collection_row()?;
        self.drop_collection()?;
        tracing::info!("Deleted collection '{}'", self.name);
        Ok(())
    }

    /// Destroy and immediately recreate the collection, empty.
    ///
    /// An existing collection keeps its established dimensionality.
    pub fn reset(&mut self) -> AppResult<()> {
        let dimension = match self.collection_row() {
            Ok(row) => row.dimension,
            Err(AppError::CollectionNotFound(_)) => None,
            Err(e) => return Err(e),
        };

        self.drop_collection()?;
        self.create_collection(dimension)?;

        tracing::info!("Reset collection '{}'", self.name);
        Ok(())
    }

    fn create_collection(&self, dimension: Option<usize>) -> AppResult<()> {
        self.conn
            .execute(
                "INSERT OR IGNORE INTO collections (name, dimension, created_at) VALUES (?1, ?2, ?3)",
                params![
                    self.name,
                    dimension.map(|d| d as i64),
                    Utc::now().to_rfc3339()
                ],
            )
            .map_err(|e| AppError::Storage(format!("Failed to create collection: {}", e)))?;
        Ok(())
    }

    fn drop_collection(&mut self) -> AppResult<()> {
        let tx = self
            .conn
            .transaction()
            .map_err(|e| AppError::Storage(format!("Failed to begin transaction: {}", e)))?;
        tx.execute(
            "DELETE FROM records WHERE collection = ?1",
            params![self.name],
        )
        .map_err(|e| AppError::Storage(format!("Failed to delete records: {}", e)))?;
        tx.execute(
            "DELETE FROM collections WHERE name = ?1",
            params![self.name],
        )
        .map_err(|e| AppError::Storage(format!("Failed to delete collection: {}", e)))?;
        tx.commit()
            .map_err(|e| AppError::Storage(format!("Failed to commit delete: {}", e)))?;
        Ok(())
    }

    fn collection_row(&self) -> AppResult<CollectionRow> {
        let row: Option<(Option<i64>, String)> = self
            .conn
            .query_row(
                "SELECT dimension, created_at FROM collections WHERE name = ?1",
                params![self.name],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .map_err(|e| AppError::Storage(format!("Failed to read collection: {}", e)))?;

        let (dimension, created_at) =
            row.ok_or_else(|| AppError::CollectionNotFound(self.name.clone()))?;

        let created_at = DateTime::parse_from_rfc3339(&created_at)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|e| AppError::Storage(format!("Invalid collection timestamp: {}", e)))?;

        Ok(CollectionRow {
            dimension: dimension.map(|d| d as usize),
            created_at,
        })
    }

    fn scan(&self) -> AppResult<Vec<Record>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, text, embedding, metadata, degraded FROM records
                 WHERE collection = ?1 ORDER BY seq",
            )
            .map_err(|e| AppError::Storage(format!("Failed to prepare scan: {}", e)))?;

        let rows = stmt
            .query_map(params![self.name], record_from_row)
            .map_err(|e| AppError::Storage(format!("Failed to scan records: {}", e)))?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| AppError::Storage(format!("Failed to decode record: {}", e)))
    }
}

fn record_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Record> {
    let embedding_bytes: Vec<u8> = row.get(2)?;
    let vector = bytes_to_embedding(&embedding_bytes)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Blob, Box::new(e)))?;

    let metadata_json: String = row.get(3)?;
    let metadata: Metadata = serde_json::from_str(&metadata_json)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e)))?;

    Ok(Record {
        id: row.get(0)?,
        text: row.get(1)?,
        vector,
        metadata,
        degraded: row.get(4)?,
    })
}

/// Convert embedding vector to little-endian bytes for storage.
fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(embedding.len() * 4);
    for &value in embedding {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

/// Convert stored bytes back to an embedding vector.
fn bytes_to_embedding(bytes: &[u8]) -> AppResult<Vec<f32>> {
    if bytes.len() % 4 != 0 {
        return Err(AppError::Storage(
            "Invalid embedding bytes length".to_string(),
        ));
    }

    Ok(bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}

/// Cosine distance `1 - cos(a, b)`. A zero-norm side counts as similarity 0.
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }

    1.0 - dot_product / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(id: &str, source: &str, index: usize, vector: Vec<f32>) -> Record {
        Record {
            id: id.to_string(),
            vector,
            text: format!("text of {}", id),
            metadata: Metadata::for_chunk(source, index, source),
            degraded: false,
        }
    }

    #[test]
    fn test_open_creates_database() {
        let temp = TempDir::new().unwrap();
        let store = VectorStore::open(&temp.path().join("store"), "notes").unwrap();

        assert!(store.path().exists());
        assert_eq!(store.name(), "notes");
        assert_eq!(store.count().unwrap(), 0);
        assert_eq!(store.dimension().unwrap(), None);
    }

    #[test]
    fn test_upsert_and_get() {
        let temp = TempDir::new().unwrap();
        let mut store = VectorStore::open(temp.path(), "notes").unwrap();

        let written = store
            .upsert(&[record("a.txt_0", "a.txt", 0, vec![1.0, 0.0, 0.0])])
            .unwrap();
        assert_eq!(written, 1);
        assert_eq!(store.dimension().unwrap(), Some(3));

        let fetched = store.get("a.txt_0").unwrap().unwrap();
        assert_eq!(fetched.vector, vec![1.0, 0.0, 0.0]);
        assert_eq!(fetched.metadata.source(), Some("a.txt"));
        assert!(store.get("missing").unwrap().is_none());
    }

    #[test]
    fn test_empty_upsert_is_noop() {
        let temp = TempDir::new().unwrap();
        let mut store = VectorStore::open(temp.path(), "notes").unwrap();

        assert_eq!(store.upsert(&[]).unwrap(), 0);
        assert_eq!(store.dimension().unwrap(), None);
    }

    #[test]
    fn test_overwrite_does_not_duplicate() {
        let temp = TempDir::new().unwrap();
        let mut store = VectorStore::open(temp.path(), "notes").unwrap();

        store
            .upsert(&[record("a.txt_0", "a.txt", 0, vec![1.0, 0.0])])
            .unwrap();
        let mut updated = record("a.txt_0", "a.txt", 0, vec![0.0, 1.0]);
        updated.text = "new text".to_string();
        store.upsert(&[updated]).unwrap();

        assert_eq!(store.count().unwrap(), 1);
        assert_eq!(store.get("a.txt_0").unwrap().unwrap().text, "new text");
    }

    #[test]
    fn test_dimension_mismatch_leaves_collection_unchanged() {
        let temp = TempDir::new().unwrap();
        let mut store = VectorStore::open(temp.path(), "notes").unwrap();
        store
            .upsert(&[record("a_0", "a", 0, vec![1.0, 0.0, 0.0])])
            .unwrap();

        let batch = vec![
            record("b_0", "b", 0, vec![0.0, 1.0, 0.0]),
            record("b_1", "b", 1, vec![0.0, 1.0]),
        ];
        let err = store.upsert(&batch).unwrap_err();

        assert!(matches!(
            err,
            AppError::DimensionMismatch {
                expected: 3,
                actual: 2
            }
        ));
        assert_eq!(store.count().unwrap(), 1);
        assert!(store.get("b_0").unwrap().is_none());
    }

    #[test]
    fn test_mixed_dimensions_in_first_batch() {
        let temp = TempDir::new().unwrap();
        let mut store = VectorStore::open(temp.path(), "notes").unwrap();

        let batch = vec![
            record("a_0", "a", 0, vec![1.0, 0.0]),
            record("a_1", "a", 1, vec![1.0, 0.0, 0.0]),
        ];
        assert!(matches!(
            store.upsert(&batch),
            Err(AppError::DimensionMismatch { .. })
        ));
        assert_eq!(store.dimension().unwrap(), None);
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_query_wrong_dimension() {
        let temp = TempDir::new().unwrap();
        let mut store = VectorStore::open(temp.path(), "notes").unwrap();
        store.upsert(&[record("a_0", "a", 0, vec![1.0, 0.0])]).unwrap();

        assert!(matches!(
            store.query(&[1.0, 0.0, 0.0], 3, None),
            Err(AppError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_query_k_zero_and_empty_collection() {
        let temp = TempDir::new().unwrap();
        let mut store = VectorStore::open(temp.path(), "notes").unwrap();
        assert!(store.query(&[1.0, 0.0], 5, None).unwrap().is_empty());

        store.upsert(&[record("a_0", "a", 0, vec![1.0, 0.0])]).unwrap();
        assert!(store.query(&[1.0, 0.0], 0, None).unwrap().is_empty());
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let temp = TempDir::new().unwrap();
        let mut store = VectorStore::open(temp.path(), "notes").unwrap();
        store
            .upsert(&[
                record("first", "a", 0, vec![0.6, 0.8]),
                record("second", "a", 1, vec![0.6, 0.8]),
                record("third", "a", 2, vec![0.6, 0.8]),
            ])
            .unwrap();
        // Overwriting keeps the original position
        store
            .upsert(&[record("first", "a", 0, vec![0.6, 0.8])])
            .unwrap();

        let ids: Vec<String> = store
            .query(&[1.0, 0.0], 3, None)
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_zero_vector_ranks_last() {
        let temp = TempDir::new().unwrap();
        let mut store = VectorStore::open(temp.path(), "notes").unwrap();
        let mut degraded = record("zero", "a", 0, vec![0.0, 0.0]);
        degraded.degraded = true;
        store
            .upsert(&[degraded, record("real", "a", 1, vec![1.0, 0.5])])
            .unwrap();

        let results = store.query(&[1.0, 0.0], 2, None).unwrap();
        assert_eq!(results[0].id, "real");
        assert_eq!(results[1].id, "zero");
        assert!((results[1].distance - 1.0).abs() < 1e-6);
        assert!(results[1].degraded);
    }

    #[test]
    fn test_filter_restricts_results() {
        let temp = TempDir::new().unwrap();
        let mut store = VectorStore::open(temp.path(), "notes").unwrap();
        store
            .upsert(&[
                record("doc1.pdf_0", "doc1.pdf", 0, vec![1.0, 0.0]),
                record("doc2.pdf_0", "doc2.pdf", 0, vec![1.0, 0.0]),
                record("doc1.pdf_1", "doc1.pdf", 1, vec![0.0, 1.0]),
            ])
            .unwrap();

        let filter = MetadataFilter::new().with("source", "doc1.pdf");
        let results = store.query(&[1.0, 0.0], 10, Some(&filter)).unwrap();

        assert_eq!(results.len(), 2);
        assert!(results
            .iter()
            .all(|r| r.metadata.source() == Some("doc1.pdf")));
    }

    #[test]
    fn test_delete_and_prune() {
        let temp = TempDir::new().unwrap();
        let mut store = VectorStore::open(temp.path(), "notes").unwrap();
        store
            .upsert(&[
                record("a_0", "a", 0, vec![1.0, 0.0]),
                record("a_1", "a", 1, vec![1.0, 0.0]),
                record("a_2", "a", 2, vec![1.0, 0.0]),
                record("b_0", "b", 0, vec![1.0, 0.0]),
            ])
            .unwrap();

        assert_eq!(store.delete_source_chunks_from("a", 1).unwrap(), 2);
        assert_eq!(store.delete(&["b_0".to_string(), "nope".to_string()]).unwrap(), 1);

        let remaining: Vec<String> = store.get_all().unwrap().into_iter().map(|r| r.id).collect();
        assert_eq!(remaining, vec!["a_0"]);
    }

    #[test]
    fn test_persists_across_reopen() {
        let temp = TempDir::new().unwrap();
        {
            let mut store = VectorStore::open(temp.path(), "notes").unwrap();
            store.upsert(&[record("a_0", "a", 0, vec![0.5, 0.5])]).unwrap();
        }

        let store = VectorStore::open(temp.path(), "notes").unwrap();
        assert_eq!(store.count().unwrap(), 1);
        assert_eq!(store.dimension().unwrap(), Some(2));
    }

    #[test]
    fn test_collections_are_isolated() {
        let temp = TempDir::new().unwrap();
        let mut first = VectorStore::open(temp.path(), "first").unwrap();
        let second = VectorStore::open(temp.path(), "second").unwrap();

        first.upsert(&[record("a_0", "a", 0, vec![1.0])]).unwrap();

        assert_eq!(first.count().unwrap(), 1);
        assert_eq!(second.count().unwrap(), 0);
    }

    #[test]
    fn test_delete_collection_then_reset() {
        let temp = TempDir::new().unwrap();
        let mut store = VectorStore::open(temp.path(), "notes").unwrap();
        store.upsert(&[record("a_0", "a", 0, vec![1.0, 0.0])]).unwrap();

        store.delete_collection().unwrap();
        assert!(matches!(
            store.count(),
            Err(AppError::CollectionNotFound(_))
        ));
        assert!(matches!(
            store.upsert(&[record("a_0", "a", 0, vec![1.0, 0.0])]),
            Err(AppError::CollectionNotFound(_))
        ));

        store.reset().unwrap();
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_reset_keeps_dimension() {
        let temp = TempDir::new().unwrap();
        let mut store = VectorStore::open(temp.path(), "notes").unwrap();
        store.upsert(&[record("a_0", "a", 0, vec![1.0, 0.0])]).unwrap();

        store.reset().unwrap();

        assert_eq!(store.count().unwrap(), 0);
        assert_eq!(store.dimension().unwrap(), Some(2));
        assert!(matches!(
            store.upsert(&[record("a_0", "a", 0, vec![1.0, 0.0, 0.0])]),
            Err(AppError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_cosine_distance() {
        assert!(cosine_distance(&[1.0, 0.0], &[1.0, 0.0]).abs() < 1e-6);
        assert!((cosine_distance(&[1.0, 0.0], &[0.0, 1.0]) - 1.0).abs() < 1e-6);
        assert!((cosine_distance(&[1.0, 0.0], &[-1.0, 0.0]) - 2.0).abs() < 1e-6);
        assert!((cosine_distance(&[0.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
    }
}
