//! Query path: embed the query, rank stored records.

use crate::embeddings::EmbeddingEngine;
use crate::metadata::MetadataFilter;
use crate::store::VectorStore;
use crate::types::RetrievalResult;
use docrag_core::AppResult;

/// Ranks collection records against free-text queries.
pub struct RetrievalEngine<'a> {
    embeddings: &'a EmbeddingEngine,
    store: &'a VectorStore,
}

impl<'a> RetrievalEngine<'a> {
    pub fn new(embeddings: &'a EmbeddingEngine, store: &'a VectorStore) -> Self {
        Self { embeddings, store }
    }

    /// Return up to `n_results` records closest to `query`, nearest first.
    ///
    /// Texts are returned in full. If the query itself cannot be embedded it
    /// is ranked as a zero vector, so every result has distance 1.
    pub async fn retrieve(
        &self,
        query: &str,
        n_results: usize,
        filter: Option<&MetadataFilter>,
    ) -> AppResult<Vec<RetrievalResult>> {
        tracing::info!(
            "Querying collection '{}' (n_results={}): {}",
            self.store.name(),
            n_results,
            query
        );

        let embedding = self.embeddings.embed(query).await;
        if embedding.degraded {
            tracing::warn!("Query embedding failed; ranking against a zero vector");
        }

        let results = self.store.query(&embedding.vector, n_results, filter)?;

        match (results.first(), results.last()) {
            (Some(best), Some(worst)) => tracing::info!(
                "Retrieved {} chunks (best distance: {:.3}, worst: {:.3})",
                results.len(),
                best.distance,
                worst.distance
            ),
            _ => tracing::info!("No matching chunks found"),
        }

        Ok(results)
    }
}
