//! Tabula CLI — the main entry point.
//!
//! Commands:
//! - `init`      — Create the schema and seed the default dataset
//! - `ingest`    — Upload a CSV or JSON file
//! - `datasets`  — List datasets, newest first
//! - `rows`      — Print a dataset's stored rows
//! - `ask`       — Answer a question from a dataset
//! - `config`    — Print the effective configuration

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tabula_config::AppConfig;
use tracing::error;

mod commands;

#[derive(Parser)]
#[command(
    name = "tabula",
    about = "Tabula — ask questions about your CSV and JSON files",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to ~/.tabula/config.toml)
    #[arg(short, long, global = true, env = "TABULA_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database schema and seed the default dataset
    Init,

    /// Ingest a .csv or .json file as a new dataset
    Ingest {
        /// File to upload
        file: PathBuf,

        /// Dataset name (defaults to the file name; its extension picks the parser)
        #[arg(short, long)]
        name: Option<String>,
    },

    /// List datasets, newest first
    Datasets {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the stored rows of a dataset
    Rows {
        /// Dataset ID
        dataset_id: String,

        /// Show at most this many rows
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Ask a question about a dataset
    Ask {
        /// The question
        question: String,

        /// Dataset ID (defaults to the most recent dataset)
        #[arg(short, long)]
        dataset: Option<String>,

        /// Print the answer payload as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the effective configuration as TOML
    Config,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    let (config, config_path) = match cli.config {
        Some(path) => (AppConfig::load_with_env(&path), path),
        None => (AppConfig::load(), AppConfig::default_path()),
    };
    let config = config.map_err(|e| format!("Failed to load config: {e}"))?;

    let result = match cli.command {
        Commands::Config => commands::config_cmd::run(&config, &config_path).await,
        command => run(command, config).await,
    };

    if let Err(e) = &result {
        match e.downcast_ref::<tabula_core::Error>() {
            Some(app) => error!(class = ?app.class(), "{app}"),
            None => error!("{e}"),
        }
    }
    result
}

async fn run(command: Commands, config: AppConfig) -> commands::CommandResult {
    let runtime = commands::startup(config).await?;

    match command {
        Commands::Init => commands::init::run(&runtime).await,
        Commands::Ingest { file, name } => commands::ingest::run(&runtime, &file, name).await,
        Commands::Datasets { json } => commands::datasets::run(&runtime, json).await,
        Commands::Rows { dataset_id, limit } => {
            commands::rows::run(&runtime, &dataset_id, limit).await
        }
        Commands::Ask {
            question,
            dataset,
            json,
        } => commands::ask::run(&runtime, &question, dataset.as_deref(), json).await,
        Commands::Config => Ok(()),
    }
}
