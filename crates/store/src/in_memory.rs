//! In-memory store — useful for testing and throwaway sessions.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tabula_core::error::StoreError;
use tabula_core::store::DatasetStore;
use tabula_core::{Dataset, NewDataset, Row};
use tokio::sync::RwLock;

#[derive(Default)]
struct Inner {
    /// Insertion order.
    datasets: Vec<Dataset>,
    rows: HashMap<String, Vec<Row>>,
}

/// A store that keeps every dataset in process memory.
///
/// A single write lock covers both the summary and the rows, so readers
/// never observe a partially written dataset.
pub struct InMemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner::default())),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DatasetStore for InMemoryStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn initialize(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn insert_dataset(&self, dataset: NewDataset) -> Result<Option<Dataset>, StoreError> {
        let mut inner = self.inner.write().await;
        if inner.datasets.iter().any(|d| d.id == dataset.id) {
            return Ok(None);
        }

        let summary = dataset.summary();
        let rows = dataset
            .rows
            .into_iter()
            .enumerate()
            .map(|(i, fields)| Row::new(summary.id.clone(), i, fields))
            .collect();

        inner.rows.insert(summary.id.clone(), rows);
        inner.datasets.push(summary.clone());
        Ok(Some(summary))
    }

    async fn list_datasets(&self) -> Result<Vec<Dataset>, StoreError> {
        let inner = self.inner.read().await;
        // Reverse first so the stable sort breaks timestamp ties newest-insert-first.
        let mut datasets: Vec<Dataset> = inner.datasets.iter().rev().cloned().collect();
        datasets.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(datasets)
    }

    async fn get_dataset(&self, id: &str) -> Result<Option<Dataset>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.datasets.iter().find(|d| d.id == id).cloned())
    }

    async fn latest_dataset_id(&self) -> Result<Option<String>, StoreError> {
        Ok(self
            .list_datasets()
            .await?
            .into_iter()
            .next()
            .map(|d| d.id))
    }

    async fn fetch_rows(&self, id: &str) -> Result<Vec<Row>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.rows.get(id).cloned().unwrap_or_default())
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.inner.read().await.datasets.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use tabula_core::{FileType, Fields};

    fn rows(n: usize) -> Vec<Fields> {
        (0..n)
            .map(|i| [("n", i.to_string())].into_iter().collect())
            .collect()
    }

    #[tokio::test]
    async fn create_and_fetch() {
        let store = InMemoryStore::new();
        let ds = store
            .create_dataset(rows(3), "n.csv", FileType::Csv)
            .await
            .unwrap();

        let fetched = store.fetch_rows(&ds.id).await.unwrap();
        assert_eq!(fetched.len(), 3);
        assert_eq!(fetched[2].row_index, 2);
        assert_eq!(fetched[2].fields.get("n"), Some("2"));
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn latest_follows_created_at_then_insertion() {
        let store = InMemoryStore::new();
        let mut older = NewDataset::new("old.csv", FileType::Csv, rows(1)).with_id("old");
        older.created_at = Utc::now() - Duration::hours(1);
        let newer = NewDataset::new("new.csv", FileType::Csv, rows(1)).with_id("new");
        let tied = NewDataset {
            created_at: newer.created_at,
            ..NewDataset::new("tie.csv", FileType::Csv, rows(1)).with_id("tie")
        };

        store.insert_dataset(newer).await.unwrap();
        store.insert_dataset(older).await.unwrap();
        store.insert_dataset(tied).await.unwrap();

        let ids: Vec<String> = store
            .list_datasets()
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(ids, vec!["tie", "new", "old"]);
        assert_eq!(store.latest_dataset_id().await.unwrap().as_deref(), Some("tie"));
    }

    #[tokio::test]
    async fn duplicate_id_is_not_written() {
        let store = InMemoryStore::new();
        let first = NewDataset::new("a.csv", FileType::Csv, rows(2)).with_id("same");
        let second = NewDataset::new("b.csv", FileType::Csv, rows(5)).with_id("same");

        assert!(store.insert_dataset(first).await.unwrap().is_some());
        assert!(store.insert_dataset(second).await.unwrap().is_none());
        assert_eq!(store.fetch_rows("same").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn unknown_dataset() {
        let store = InMemoryStore::default();
        assert!(!store.dataset_exists("nope").await.unwrap());
        assert!(store.fetch_rows("nope").await.unwrap().is_empty());
        assert!(store.latest_dataset_id().await.unwrap().is_none());
    }
}
