//! Info command handler.

use super::{open_knowledge_base, print_json};
use clap::Args;
use docrag_core::{config::AppConfig, AppResult};

/// Show collection statistics
#[derive(Args, Debug)]
pub struct InfoCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl InfoCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!(
            "Executing info command for collection '{}'",
            config.collection
        );

        let kb = open_knowledge_base(config)?;
        let info = kb.info()?;

        if self.json {
            print_json(&serde_json::json!({
                "collection": info.collection,
                "totalChunks": info.total_chunks,
                "totalSources": info.total_sources,
                "sources": info.sources,
                "degradedChunks": info.degraded_chunks,
                "dimension": info.dimension,
                "createdAt": info.created_at,
                "provider": kb.embeddings().provider().provider_name(),
                "model": kb.embeddings().provider().model_name(),
            }))?;
        } else {
            println!("Collection: {}", info.collection);
            println!("  Chunks: {}", info.total_chunks);
            println!("  Sources: {}", info.total_sources);
            if info.degraded_chunks > 0 {
                println!("  Degraded chunks: {}", info.degraded_chunks);
            }
            match info.dimension {
                Some(dimension) => println!("  Dimension: {}", dimension),
                None => println!("  Dimension: (not yet established)"),
            }
            println!("  Created: {}", info.created_at.to_rfc3339());
            println!(
                "  Embeddings: {} ({})",
                kb.embeddings().provider().provider_name(),
                kb.embeddings().provider().model_name()
            );
            for source in &info.sources {
                println!("  - {}", source);
            }
        }

        Ok(())
    }
}
