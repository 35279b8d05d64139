use std::path::PathBuf;

use clap::{Parser, Subcommand};
use ragline::Result;
use ragline::commands::{ask, ingest, search, show_status};
use ragline::config::{run_interactive_config, show_config};

#[derive(Parser)]
#[command(name = "ragline")]
#[command(about = "Local retrieval-augmented generation over plain-text documents")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configure Ollama connection and chunking settings
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
    /// Index text files for retrieval
    Ingest {
        /// Paths of UTF-8 text files to index
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Ask a question answered from the indexed documents
    Ask {
        /// The question to answer
        question: String,
        /// Number of chunks to retrieve as context
        #[arg(long, default_value = "5")]
        limit: usize,
    },
    /// Show the chunks most similar to a query
    Search {
        /// Search query
        query: String,
        /// Maximum number of results
        #[arg(long, default_value = "5")]
        limit: usize,
    },
    /// Show configuration and index status
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Config { show } => {
            if show {
                show_config()?;
            } else {
                run_interactive_config()?;
            }
        }
        Commands::Ingest { paths } => {
            ingest(paths).await?;
        }
        Commands::Ask { question, limit } => {
            ask(question, limit).await?;
        }
        Commands::Search { query, limit } => {
            search(query, limit).await?;
        }
        Commands::Status => {
            show_status().await?;
        }
    }

    Ok(())
}
