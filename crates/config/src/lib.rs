//! Configuration loading, validation, and management for Tabula.
//!
//! Loads configuration from `~/.tabula/config.toml` (or `$TABULA_CONFIG`)
//! with environment variable overrides. The resulting [`AppConfig`] is built
//! once at startup and handed to each component; nothing reads the
//! environment after that.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.tabula/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Row storage
    #[serde(default)]
    pub storage: StorageConfig,

    /// Text-generation collaborator
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Lexical retrieval tuning
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Default dataset seeding
    #[serde(default)]
    pub seed: SeedConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// SQLite database file
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_storage_path() -> PathBuf {
    AppConfig::config_dir().join("tabula.db")
}
fn default_max_connections() -> u32 {
    4
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
            max_connections: default_max_connections(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Base URL of the Ollama-compatible server
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// Upper bound on a single generation call
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:11434".into()
}
fn default_model() -> String {
    "mistral".into()
}
fn default_timeout_secs() -> u64 {
    120
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Rows handed to the generator per question
    #[serde(default = "default_limit")]
    pub limit: usize,

    /// Rows scoring below this are not considered matches
    #[serde(default = "default_min_score")]
    pub min_score: usize,

    /// Question tokens shorter than this are ignored
    #[serde(default = "default_min_token_len")]
    pub min_token_len: usize,

    /// Character budget for the assembled context
    #[serde(default = "default_max_context_chars")]
    pub max_context_chars: usize,
}

fn default_limit() -> usize {
    6
}
fn default_min_score() -> usize {
    1
}
fn default_min_token_len() -> usize {
    3
}
fn default_max_context_chars() -> usize {
    12_000
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            min_score: default_min_score(),
            min_token_len: default_min_token_len(),
            max_context_chars: default_max_context_chars(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Well-known ID of the seeded dataset
    #[serde(default = "default_seed_dataset_id")]
    pub dataset_id: String,

    /// Fixture file loaded through the normal ingest path
    #[serde(default = "default_seed_path")]
    pub path: PathBuf,
}

fn default_true() -> bool {
    true
}
/// ID the bundled fixture is seeded under unless configured otherwise.
pub const DEFAULT_DATASET_ID: &str = "default";

fn default_seed_dataset_id() -> String {
    DEFAULT_DATASET_ID.into()
}
fn default_seed_path() -> PathBuf {
    PathBuf::from("data/sample/employees.csv")
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dataset_id: default_seed_dataset_id(),
            path: default_seed_path(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `$TABULA_CONFIG` or `~/.tabula/config.toml`.
    ///
    /// Environment overrides (highest priority):
    /// - `TABULA_DATABASE_PATH`
    /// - `OLLAMA_BASE_URL`, `OLLAMA_MODEL`
    /// - `TABULA_SEED_PATH`
    /// - `RETRIEVAL_MIN_SCORE`
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with_env(&Self::default_path())
    }

    /// `$TABULA_CONFIG`, else `~/.tabula/config.toml`.
    pub fn default_path() -> PathBuf {
        std::env::var("TABULA_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| Self::config_dir().join("config.toml"))
    }

    /// Load `path`, then apply the environment overrides listed on [`AppConfig::load`].
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load_from(path)?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(path) = std::env::var("TABULA_DATABASE_PATH") {
            self.storage.path = PathBuf::from(path);
        }
        if let Ok(url) = std::env::var("OLLAMA_BASE_URL") {
            self.generation.base_url = url;
        }
        if let Ok(model) = std::env::var("OLLAMA_MODEL") {
            self.generation.model = model;
        }
        if let Ok(path) = std::env::var("TABULA_SEED_PATH") {
            self.seed.path = PathBuf::from(path);
        }
        if let Ok(raw) = std::env::var("RETRIEVAL_MIN_SCORE") {
            self.retrieval.min_score = raw.trim().parse().map_err(|_| {
                ConfigError::ValidationError(format!(
                    "RETRIEVAL_MIN_SCORE must be a positive integer, got '{raw}'"
                ))
            })?;
        }
        Ok(())
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".tabula")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.max_connections == 0 {
            return Err(ConfigError::ValidationError(
                "storage.max_connections must be > 0".into(),
            ));
        }

        if self.generation.base_url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "generation.base_url must not be empty".into(),
            ));
        }

        if self.generation.model.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "generation.model must not be empty".into(),
            ));
        }

        if self.generation.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "generation.timeout_secs must be > 0".into(),
            ));
        }

        if self.retrieval.limit == 0 {
            return Err(ConfigError::ValidationError(
                "retrieval.limit must be > 0".into(),
            ));
        }

        if self.retrieval.min_score == 0 {
            return Err(ConfigError::ValidationError(
                "retrieval.min_score must be >= 1".into(),
            ));
        }

        if self.retrieval.min_token_len == 0 {
            return Err(ConfigError::ValidationError(
                "retrieval.min_token_len must be >= 1".into(),
            ));
        }

        Ok(())
    }

    /// Render the configuration as TOML (for `tabula config`).
    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_default()
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        Self::default().to_toml()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            generation: GenerationConfig::default(),
            retrieval: RetrievalConfig::default(),
            seed: SeedConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
