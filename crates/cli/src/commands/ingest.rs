//! Ingest command handler.

use super::{knowledge_base_config, print_json};
use clap::Args;
use docrag_core::{config::AppConfig, AppResult};
use docrag_knowledge::{
    config as kb_config, KnowledgeBase, Metadata, MetadataFilter, ProgressEvent, ProgressReporter,
};
use std::path::PathBuf;
use std::sync::Arc;

/// Load, chunk and embed documents
#[derive(Args, Debug)]
pub struct IngestCommand {
    /// Files or directories to ingest (default: the configured data directory)
    pub paths: Vec<PathBuf>,

    /// Metadata attached to every chunk (key=value, repeatable)
    #[arg(long = "meta", value_name = "KEY=VALUE")]
    pub meta: Vec<String>,

    /// Delete every record of the collection first
    #[arg(long)]
    pub reset: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl IngestCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!(
            "Executing ingest command for collection '{}'",
            config.collection
        );

        let paths = if self.paths.is_empty() {
            vec![config.data_dir.clone()]
        } else {
            self.paths.clone()
        };

        let mut extra = Metadata::new();
        for pair in &self.meta {
            let (key, value) = MetadataFilter::parse_pair(pair)?;
            extra.insert(key, value);
        }

        let kb_settings = knowledge_base_config(config)?;
        let mut kb = KnowledgeBase::from_config(kb_settings.clone())?;
        if !self.json {
            kb = kb.with_progress(ProgressReporter::new(Arc::new(|event: ProgressEvent| {
                eprintln!("{}", event.format_simple());
            })));
        }

        if self.reset {
            kb.reset_collection()?;
        }

        let report = kb.ingest_with_metadata(&paths, &extra).await?;

        // Remember the settings the collection was built with
        kb_config::save_config(&config.workspace, &kb_settings)?;

        if self.json {
            let skipped: Vec<serde_json::Value> = report
                .files_skipped
                .iter()
                .map(|s| serde_json::json!({ "path": s.path, "reason": s.reason }))
                .collect();
            print_json(&serde_json::json!({
                "collection": config.collection,
                "filesProcessed": report.files_processed,
                "chunksAdded": report.chunks_added,
                "degradedChunks": report.degraded_chunks,
                "filesSkipped": skipped,
                "durationSecs": report.duration_secs,
            }))?;
        } else {
            println!(
                "Ingested {} documents ({} chunks) into '{}' in {:.2}s",
                report.files_processed,
                report.chunks_added,
                config.collection,
                report.duration_secs
            );
            if report.degraded_chunks > 0 {
                println!(
                    "  {} chunks stored with zero-vector embeddings (embedding provider unavailable)",
                    report.degraded_chunks
                );
            }
            for skipped in &report.files_skipped {
                println!("  Skipped {}: {}", skipped.path.display(), skipped.reason);
            }
        }

        Ok(())
    }
}
