//! docrag CLI
//!
//! Main entry point for the docrag command-line tool.
//! Ingests local documents into a vector collection and queries it.

mod commands;

use clap::{Parser, Subcommand};
use commands::{IngestCommand, InfoCommand, QueryCommand, ResetCommand};
use docrag_core::{config::AppConfig, logging, AppResult};
use std::path::PathBuf;

/// docrag - local document retrieval
#[derive(Parser, Debug)]
#[command(name = "docrag")]
#[command(about = "Local document knowledge base with semantic retrieval", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "DOCRAG_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "DOCRAG_CONFIG")]
    config: Option<PathBuf>,

    /// Collection name
    #[arg(long, global = true, env = "DOCRAG_COLLECTION")]
    collection: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Load, chunk and embed documents into the collection
    Ingest(IngestCommand),

    /// Retrieve the chunks most similar to a query
    Query(QueryCommand),

    /// Show collection statistics
    Info(InfoCommand),

    /// Delete every record of the collection
    Reset(ResetCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    // Load configuration from the chosen workspace, its YAML file and the environment
    let config = AppConfig::load_from(cli.workspace, cli.config)?;

    // Apply the remaining CLI overrides
    let config = config.with_overrides(cli.collection, cli.log_level, cli.verbose, cli.no_color);
    config.validate()?;

    // Initialize logging with final configuration
    logging::init_logging(config.log_level.as_deref(), config.no_color)?;

    tracing::info!("docrag starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("Collection: {}", config.collection);

    config.ensure_docrag_dir()?;

    let command_name = match &cli.command {
        Commands::Ingest(_) => "ingest",
        Commands::Query(_) => "query",
        Commands::Info(_) => "info",
        Commands::Reset(_) => "reset",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    // Route to command handlers
    let result = match cli.command {
        Commands::Ingest(cmd) => cmd.execute(&config).await,
        Commands::Query(cmd) => cmd.execute(&config).await,
        Commands::Info(cmd) => cmd.execute(&config).await,
        Commands::Reset(cmd) => cmd.execute(&config).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
