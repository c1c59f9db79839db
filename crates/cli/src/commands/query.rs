//! Query command handler.

use super::{open_knowledge_base, print_json};
use clap::Args;
use docrag_core::{config::AppConfig, AppResult};
use docrag_knowledge::MetadataFilter;

/// Chars of chunk text shown per result in human-readable output.
const PREVIEW_CHARS: usize = 200;

/// Retrieve the chunks most similar to a query
#[derive(Args, Debug)]
pub struct QueryCommand {
    /// Query text
    pub query: String,

    /// Number of chunks to retrieve
    #[arg(short = 'k', long, default_value = "4")]
    pub top_k: usize,

    /// Only consider chunks whose metadata matches (key=value, repeatable)
    #[arg(long = "filter", value_name = "KEY=VALUE")]
    pub filters: Vec<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl QueryCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!(
            "Executing query command for collection '{}'",
            config.collection
        );

        let filter = MetadataFilter::from_pairs(&self.filters)?;
        let filter = (!filter.is_empty()).then_some(filter);

        let kb = open_knowledge_base(config)?;
        let results = kb.retrieve(&self.query, self.top_k, filter.as_ref()).await?;

        if self.json {
            let value = serde_json::to_value(&results)?;
            print_json(&value)?;
            return Ok(());
        }

        if results.is_empty() {
            println!("No results in collection '{}'", config.collection);
            return Ok(());
        }

        for (rank, result) in results.iter().enumerate() {
            let source = result.metadata.source().unwrap_or("unknown");
            let marker = if result.degraded { " [degraded]" } else { "" };
            println!(
                "{}. {} (distance {:.4}){}",
                rank + 1,
                result.id,
                result.distance,
                marker
            );
            println!("   source: {}", source);
            println!("   {}", preview(&result.text));
        }

        Ok(())
    }
}

/// First `PREVIEW_CHARS` chars of `text` on one line.
fn preview(text: &str) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= PREVIEW_CHARS {
        flat
    } else {
        let cut: String = flat.chars().take(PREVIEW_CHARS).collect();
        format!("{}...", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_truncates_on_chars() {
        let text = "\u{e9}".repeat(250);
        let shown = preview(&text);
        assert_eq!(shown.chars().count(), PREVIEW_CHARS + 3);
        assert!(shown.ends_with("..."));
    }

    #[test]
    fn test_preview_flattens_whitespace() {
        assert_eq!(preview("one\n\ntwo   three"), "one two three");
    }
}
