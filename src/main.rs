use clap::{Parser, Subcommand};
use parts_assistant::Result;
use parts_assistant::catalog::DEFAULT_CATALOG_FILE;
use parts_assistant::catalog::sample::DEFAULT_SAMPLE_COUNT;
use parts_assistant::commands::{ask, generate_sample, index_catalog, serve, show_status};
use parts_assistant::config::{run_interactive_config, show_config};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "parts-assistant")]
#[command(about = "Chat assistant for refrigerator and dishwasher parts")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configure Ollama, the completion service and the HTTP server
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
    /// Write a sample parts catalog
    Generate {
        /// Destination CSV file
        #[arg(long, default_value = DEFAULT_CATALOG_FILE)]
        output: PathBuf,
        /// Number of parts to generate
        #[arg(long, default_value_t = DEFAULT_SAMPLE_COUNT)]
        count: usize,
    },
    /// Rebuild the part store from a catalog CSV
    Index {
        /// Catalog CSV with category, part_number, title and description columns
        csv: PathBuf,
    },
    /// Answer a single question and exit
    Ask {
        query: String,
    },
    /// Start the HTTP chat service
    Serve {
        /// Override the configured bind host
        #[arg(long)]
        host: Option<String>,
        /// Override the configured port
        #[arg(long)]
        port: Option<u16>,
    },
    /// Show collaborator health and configuration
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
        Commands::Generate { output, count } => {
            generate_sample(&output, count)?;
        }
        Commands::Index { csv } => {
            index_catalog(&csv).await?;
        }
        Commands::Ask { query } => {
            ask(&query).await?;
        }
        Commands::Serve { host, port } => {
            serve(host, port).await?;
        }
        Commands::Status => {
            show_status().await?;
        }
    }

    Ok(())
}
