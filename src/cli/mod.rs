//! CLI adapter for finrag
//!
//! Thin clap layer over `core/`; commands load configuration, build
//! [`Services`](crate::core::services::Services) and drive the
//! pipeline.

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};

/// finrag - Financial-Report Ingestion Pipeline
///
/// Ingest annual-report PDFs: locate sections, chunk, embed and store
/// them in a vector database for semantic search.
#[derive(Parser, Debug)]
#[command(name = "finrag")]
#[command(version)]
#[command(about = "Financial-report ingestion pipeline", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(long, global = true, default_value = "human")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output for scripting
    Json,
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::Human
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ingest a directory of report PDFs
    Ingest(commands::IngestArgs),

    /// Show current configuration
    #[command(name = "show-config")]
    ShowConfig(commands::ConfigArgs),
}

/// Run the CLI with the provided arguments
pub async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    use crate::core::config::Config;
    use crate::core::services::Services;

    // Load configuration
    let mut config = Config::load()?;
    if let Commands::Ingest(args) = &cli.command {
        if let Some(language) = &args.language {
            config.sections.language = language.clone();
        }
    }
    config.log_config();

    // Create services
    let services = Services::new(config)?;

    // Execute command
    match cli.command {
        Commands::Ingest(args) => commands::ingest::execute(args, &services, cli.format).await,
        Commands::ShowConfig(args) => commands::config::execute(args, &services, cli.format).await,
    }
}
