//! Reset command handler.

use super::open_knowledge_base;
use clap::Args;
use docrag_core::{config::AppConfig, AppResult};
use std::io::{self, BufRead, Write};

/// Delete every record of the collection
#[derive(Args, Debug)]
pub struct ResetCommand {
    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

impl ResetCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!(
            "Executing reset command for collection '{}'",
            config.collection
        );

        if !self.yes && !confirm(&config.collection)? {
            println!("Aborted");
            return Ok(());
        }

        let mut kb = open_knowledge_base(config)?;
        let removed = kb.store().count()?;
        kb.reset_collection()?;

        println!(
            "Collection '{}' reset ({} chunks removed)",
            config.collection, removed
        );

        Ok(())
    }
}

fn confirm(collection: &str) -> AppResult<bool> {
    print!("Delete every record in collection '{}'? [y/N] ", collection);
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;

    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}
