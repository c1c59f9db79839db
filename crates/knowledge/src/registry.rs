//! Collection introspection.

use crate::store::VectorStore;
use crate::types::KnowledgeBaseInfo;
use docrag_core::AppResult;
use std::collections::BTreeSet;

/// Summarise a collection by scanning every record.
///
/// Sources are deduplicated by exact `source` value and returned sorted.
pub fn collect_info(store: &VectorStore) -> AppResult<KnowledgeBaseInfo> {
    let total_chunks = store.count()?;
    let records = store.get_all()?;

    let sources: BTreeSet<String> = records
        .iter()
        .filter_map(|record| record.metadata.source())
        .map(str::to_string)
        .collect();

    let degraded_chunks = records.iter().filter(|record| record.degraded).count();

    Ok(KnowledgeBaseInfo {
        collection: store.name().to_string(),
        total_chunks,
        total_sources: sources.len(),
        sources: sources.into_iter().collect(),
        degraded_chunks,
        dimension: store.dimension()?,
        created_at: store.created_at()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::Metadata;
    use crate::types::Record;
    use tempfile::TempDir;

    fn record(id: &str, source: &str, degraded: bool) -> Record {
        Record {
            id: id.to_string(),
            vector: vec![1.0, 0.0],
            text: id.to_string(),
            metadata: Metadata::for_chunk(source, 0, source),
            degraded,
        }
    }

    #[test]
    fn test_info_on_empty_collection() {
        let temp = TempDir::new().unwrap();
        let store = VectorStore::open(temp.path(), "empty").unwrap();

        let info = collect_info(&store).unwrap();
        assert_eq!(info.collection, "empty");
        assert_eq!(info.total_chunks, 0);
        assert_eq!(info.total_sources, 0);
        assert!(info.sources.is_empty());
        assert_eq!(info.dimension, None);
    }

    #[test]
    fn test_info_deduplicates_sources() {
        let temp = TempDir::new().unwrap();
        let mut store = VectorStore::open(temp.path(), "notes").unwrap();
        store
            .upsert(&[
                record("b_0", "/data/b.txt", false),
                record("a_0", "/data/a.txt", true),
                record("b_1", "/data/b.txt", false),
            ])
            .unwrap();

        let info = collect_info(&store).unwrap();
        assert_eq!(info.total_chunks, 3);
        assert_eq!(info.total_sources, 2);
        assert_eq!(info.sources, vec!["/data/a.txt", "/data/b.txt"]);
        assert_eq!(info.degraded_chunks, 1);
        assert_eq!(info.dimension, Some(2));
    }
}
