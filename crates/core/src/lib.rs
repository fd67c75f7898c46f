//! # Tabula Core
//!
//! Domain types, traits, and error definitions for the Tabula dataset
//! question-answering pipeline. This crate has **zero framework
//! dependencies** — it defines the model that the ingest, store,
//! provider and agent crates implement against.
//!
//! ## Design Philosophy
//!
//! The two external seams (row storage and text generation) are defined
//! as traits here. Implementations live in their respective crates. This
//! enables:
//! - Swapping the SQLite store for the in-memory one in tests
//! - Scripted generators instead of a live model server
//! - Clean dependency graph (all crates depend inward on core)

pub mod dataset;
pub mod error;
pub mod generation;
pub mod row;
pub mod store;

// Re-export key types at crate root for ergonomics
pub use dataset::{Dataset, FileType, NewDataset};
pub use error::{Error, ErrorClass, GenerationError, IngestError, Result, StoreError};
pub use generation::{GenerationRequest, GenerationResponse, Generator};
pub use row::{Fields, ROW_TEXT_DELIMITER, Row};
pub use store::DatasetStore;
