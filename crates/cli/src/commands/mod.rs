//! Subcommand implementations.
//!
//! Every command except `config` goes through [`startup`] first, which opens
//! the store, creates the schema and seeds the default dataset.

pub mod ask;
pub mod config_cmd;
pub mod datasets;
pub mod ingest;
pub mod init;
pub mod rows;

use std::sync::Arc;
use tabula_agent::Assistant;
use tabula_config::AppConfig;
use tabula_providers::OllamaProvider;
use tabula_store::{SeedOutcome, SqliteStore, bootstrap};
use tracing::debug;

pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Everything a command needs once the startup phase has run.
pub struct Runtime {
    pub config: AppConfig,
    pub store: Arc<SqliteStore>,
    pub seed: SeedOutcome,
}

/// Open the store and run the one-time bootstrap.
pub async fn startup(config: AppConfig) -> Result<Runtime, Box<dyn std::error::Error>> {
    let store = SqliteStore::from_config(&config.storage)
        .await
        .map_err(|e| format!("Failed to open {}: {e}", config.storage.path.display()))?;
    let seed = bootstrap(&store, &config.seed).await?;
    debug!(seed = %seed, "Startup complete");

    Ok(Runtime {
        config,
        store: Arc::new(store),
        seed,
    })
}

impl Runtime {
    /// An assistant wired to the configured Ollama endpoint.
    pub fn assistant(&self) -> Result<Assistant, Box<dyn std::error::Error>> {
        let generator = OllamaProvider::from_config(&self.config.generation)?;
        Ok(Assistant::new(
            self.store.clone(),
            Arc::new(generator),
            &self.config.retrieval,
        ))
    }
}
