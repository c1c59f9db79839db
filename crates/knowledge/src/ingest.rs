//! Ingestion pipeline: load, split, embed, store.

use crate::chunker::{split_text, ChunkConfig};
use crate::embeddings::EmbeddingEngine;
use crate::loader::{discover_documents, load_document};
use crate::metadata::Metadata;
use crate::progress::ProgressReporter;
use crate::store::VectorStore;
use crate::types::{IngestReport, Record, SkippedFile};
use docrag_core::AppResult;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// A chunk waiting for its embedding.
struct PendingChunk {
    id: String,
    text: String,
    metadata: Metadata,
}

/// Runs one ingestion batch against a store.
pub struct Ingestor<'a> {
    pub store: &'a mut VectorStore,
    pub embeddings: &'a EmbeddingEngine,
    pub chunking: ChunkConfig,
    pub progress: &'a ProgressReporter,
}

impl Ingestor<'_> {
    /// Ingest `paths` (files, or directories to scan) in one batch.
    ///
    /// Unloadable documents are skipped and reported. Every chunk is
    /// embedded before a single upsert, so a fatal store error leaves the
    /// collection as it was.
    pub async fn run(self, paths: &[PathBuf], extra: &Metadata) -> AppResult<IngestReport> {
        let start = Instant::now();
        let mut report = IngestReport::default();

        let files = expand_paths(paths, &mut report.files_skipped);
        let total = files.len() as u64;

        tracing::info!(
            "Ingesting {} documents into collection '{}'",
            files.len(),
            self.store.name()
        );

        let mut pending: Vec<PendingChunk> = Vec::new();
        let mut chunk_counts: Vec<(String, usize)> = Vec::new();
        let mut seen_names: HashSet<String> = HashSet::new();

        for (i, path) in files.iter().enumerate() {
            self.progress.load(i as u64 + 1, total, path);

            let document = match load_document(path) {
                Ok(document) => document,
                Err(e) => {
                    tracing::warn!("Skipping {:?}: {}", path, e);
                    report.files_skipped.push(SkippedFile {
                        path: path.clone(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            let source = source_name(path);
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| source.clone());

            if !seen_names.insert(file_name.clone()) {
                tracing::warn!(
                    "Several documents are named '{}'; their chunk ids collide and later ones win",
                    file_name
                );
            }

            let before = pending.len();
            for chunk in split_text(&document.text, &self.chunking)? {
                let metadata = Metadata::for_chunk(&source, chunk.index, &file_name)
                    .with_extra(extra);
                metadata.validate()?;

                pending.push(PendingChunk {
                    id: format!("{}_{}", file_name, chunk.index),
                    text: chunk.text,
                    metadata,
                });
            }

            let produced = pending.len() - before;
            tracing::debug!("Split {:?} into {} chunks", path, produced);
            if produced == 0 {
                tracing::warn!("{:?} contains no text", path);
            }

            chunk_counts.push((source, produced));
            report.files_processed += 1;
        }

        if !pending.is_empty() {
            self.progress.embed(
                pending.len() as u64,
                self.embeddings.provider().model_name(),
            );

            let texts: Vec<String> = pending.iter().map(|c| c.text.clone()).collect();
            let embeddings = self.embeddings.embed_many(&texts).await;

            let records: Vec<Record> = pending
                .into_iter()
                .zip(embeddings)
                .map(|(chunk, embedding)| Record {
                    id: chunk.id,
                    vector: embedding.vector,
                    text: chunk.text,
                    metadata: chunk.metadata,
                    degraded: embedding.degraded,
                })
                .collect();

            report.degraded_chunks = records.iter().filter(|r| r.degraded).count();

            self.progress
                .store(records.len() as u64, self.store.name());
            report.chunks_added = self.store.upsert(&records)?;
        }

        // Drop chunks left over from a longer previous version of each document
        for (source, count) in &chunk_counts {
            self.store.delete_source_chunks_from(source, *count)?;
        }

        report.duration_secs = start.elapsed().as_secs_f64();

        if report.degraded_chunks > 0 {
            tracing::warn!(
                "{} chunks were stored with zero-vector embeddings",
                report.degraded_chunks
            );
        }

        tracing::info!(
            "Ingest completed: {} documents, {} chunks, {} skipped in {:.2}s",
            report.files_processed,
            report.chunks_added,
            report.files_skipped.len(),
            report.duration_secs
        );

        Ok(report)
    }
}

/// The `source` recorded for a document: its canonical path, so that
/// different spellings of one file share their chunks.
fn source_name(path: &Path) -> String {
    path.canonicalize()
        .unwrap_or_else(|_| path.to_path_buf())
        .to_string_lossy()
        .to_string()
}

/// Replace directories by the documents they contain; report paths that do not exist.
fn expand_paths(paths: &[PathBuf], skipped: &mut Vec<SkippedFile>) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_dir() {
            match discover_documents(path) {
                Ok(found) => files.extend(found),
                Err(e) => skip(skipped, path, e.to_string()),
            }
        } else if path.exists() {
            files.push(path.clone());
        } else {
            skip(skipped, path, format!("Failed to load document {}: file not found", path.display()));
        }
    }

    files
}

fn skip(skipped: &mut Vec<SkippedFile>, path: &Path, reason: String) {
    tracing::warn!("Skipping {:?}: {}", path, reason);
    skipped.push(SkippedFile {
        path: path.to_path_buf(),
        reason,
    });
}
