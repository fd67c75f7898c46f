//! DatasetStore trait — persistent, append-only dataset storage.
//!
//! A dataset and all of its rows become visible together or not at all.
//! Nothing is ever updated or deleted once written.

use async_trait::async_trait;

use crate::dataset::{Dataset, FileType, NewDataset};
use crate::error::StoreError;
use crate::row::{Fields, Row};

/// The core DatasetStore trait.
///
/// Implementations: SQLite (production), in-memory (tests).
#[async_trait]
pub trait DatasetStore: Send + Sync {
    /// The backend name (e.g., "sqlite", "in_memory").
    fn name(&self) -> &str;

    /// Create tables and indexes. Idempotent and safe to call concurrently.
    async fn initialize(&self) -> std::result::Result<(), StoreError>;

    /// Atomically write a dataset record and all its rows.
    ///
    /// Returns `None`, writing nothing, if a dataset with the same ID exists.
    async fn insert_dataset(
        &self,
        dataset: NewDataset,
    ) -> std::result::Result<Option<Dataset>, StoreError>;

    /// Create a dataset under a fresh ID.
    async fn create_dataset(
        &self,
        rows: Vec<Fields>,
        name: &str,
        file_type: FileType,
    ) -> std::result::Result<Dataset, StoreError> {
        let dataset = NewDataset::new(name, file_type, rows);
        let id = dataset.id.clone();
        self.insert_dataset(dataset)
            .await?
            .ok_or_else(|| StoreError::WriteFailed(format!("dataset id collision: {id}")))
    }

    /// All datasets, newest first.
    async fn list_datasets(&self) -> std::result::Result<Vec<Dataset>, StoreError>;

    /// Get a dataset by ID.
    async fn get_dataset(&self, id: &str) -> std::result::Result<Option<Dataset>, StoreError>;

    async fn dataset_exists(&self, id: &str) -> std::result::Result<bool, StoreError> {
        Ok(self.get_dataset(id).await?.is_some())
    }

    /// ID of the most recently created dataset.
    async fn latest_dataset_id(&self) -> std::result::Result<Option<String>, StoreError>;

    /// Rows of a dataset, strictly ascending by `row_index`.
    async fn fetch_rows(&self, id: &str) -> std::result::Result<Vec<Row>, StoreError>;

    /// Number of stored datasets.
    async fn count(&self) -> std::result::Result<usize, StoreError>;
}
