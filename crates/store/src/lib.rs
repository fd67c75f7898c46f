//! Dataset store implementations for Tabula.

pub mod bootstrap;
pub mod in_memory;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use bootstrap::{SeedOutcome, bootstrap, seed_default_dataset};
pub use in_memory::InMemoryStore;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;
