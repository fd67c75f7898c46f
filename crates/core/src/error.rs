//! Error types for the Tabula domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context (ingest, storage, generation) has its own enum;
//! the top-level [`Error`] wraps them and adds the question-answering
//! failures.

use thiserror::Error;

/// The top-level error type for all Tabula operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Upload validation ---
    #[error("Ingest error: {0}")]
    Ingest(#[from] IngestError),

    // --- Persistence ---
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    // --- Generation collaborator ---
    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    // --- Question answering ---
    #[error("Dataset not found: {dataset_id}")]
    DatasetNotFound { dataset_id: String },

    #[error("No dataset found. Upload a dataset first.")]
    NoDatasetAvailable,

    #[error("Invalid question: {0}")]
    InvalidQuestion(String),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification a transport layer can map onto status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Caller supplied something unusable; retrying unchanged will not help.
    Client,
    /// The referenced dataset does not exist.
    NotFound,
    /// Storage or internal failure.
    Server,
}

impl Error {
    pub fn class(&self) -> ErrorClass {
        match self {
            Error::Ingest(_) | Error::NoDatasetAvailable | Error::InvalidQuestion(_) => {
                ErrorClass::Client
            }
            Error::DatasetNotFound { .. } => ErrorClass::NotFound,
            Error::Store(_)
            | Error::Generation(_)
            | Error::Config { .. }
            | Error::Serialization(_) => ErrorClass::Server,
        }
    }
}

// --- Bounded context errors ---

/// Upload validation failures. All are client-class and never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IngestError {
    #[error("Filename is required.")]
    MissingFilename,

    #[error("Uploaded file is empty: {filename}")]
    EmptyUpload { filename: String },

    #[error("Unsupported file type for '{filename}'. Please upload a .csv or .json file.")]
    UnsupportedFormat { filename: String },

    #[error(
        "JSON in '{filename}' must be an object, list of objects, or {{\"records\": [...]}} format."
    )]
    InvalidShape { filename: String },

    #[error("Failed to parse '{filename}': {reason}")]
    Malformed { filename: String, reason: String },

    #[error("No records found in uploaded file '{filename}'.")]
    EmptyDataset { filename: String },
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

/// Failures talking to the generation collaborator.
///
/// Recovered inside the answer orchestrator; callers of `ask` never see
/// these as errors, only as a degraded answer string.
#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    #[error("Generation request to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    #[error("Generation request to {url} timed out after {timeout_secs}s")]
    Timeout { url: String, timeout_secs: u64 },

    #[error("Ollama request failed ({status}) at {url} with model '{model}': {detail}")]
    Status {
        status: u16,
        url: String,
        model: String,
        detail: String,
    },

    #[error("Malformed generation response: {0}")]
    Malformed(String),
}
