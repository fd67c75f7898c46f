//! Startup bootstrap: schema creation plus the optional default dataset.
//!
//! Seeding never fails startup. Every problem with the fixture is logged
//! and reported as [`SeedOutcome::Failed`].

use std::fmt;
use std::path::Path;
use tabula_config::SeedConfig;
use tabula_core::error::StoreError;
use tabula_core::store::DatasetStore;
use tabula_core::NewDataset;
use tracing::{debug, info, warn};

/// What happened to the default dataset during startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedOutcome {
    /// The fixture was loaded under the well-known ID.
    Seeded { dataset_id: String, rows: usize },
    /// A dataset with the well-known ID was already stored.
    AlreadyPresent,
    /// Seeding is turned off in config.
    Disabled,
    /// The fixture could not be read, parsed, or written.
    Failed(String),
}

impl fmt::Display for SeedOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Seeded { dataset_id, rows } => {
                write!(f, "seeded dataset '{dataset_id}' ({rows} rows)")
            }
            Self::AlreadyPresent => write!(f, "default dataset already present"),
            Self::Disabled => write!(f, "seeding disabled"),
            Self::Failed(reason) => write!(f, "seeding failed: {reason}"),
        }
    }
}

/// Initialize the schema, then seed the default dataset.
///
/// Only schema failures are returned as errors.
pub async fn bootstrap(
    store: &dyn DatasetStore,
    seed: &SeedConfig,
) -> Result<SeedOutcome, StoreError> {
    store.initialize().await?;
    Ok(seed_default_dataset(store, seed).await)
}

/// Load the seed fixture under `seed.dataset_id` if nothing is stored there.
///
/// Safe to run from several processes at once: the insert is a no-op when
/// the ID already exists, so exactly one copy is ever written.
pub async fn seed_default_dataset(store: &dyn DatasetStore, seed: &SeedConfig) -> SeedOutcome {
    if !seed.enabled {
        debug!("Default dataset seeding disabled");
        return SeedOutcome::Disabled;
    }

    match store.dataset_exists(&seed.dataset_id).await {
        Ok(true) => {
            debug!(dataset_id = %seed.dataset_id, "Default dataset already present");
            return SeedOutcome::AlreadyPresent;
        }
        Ok(false) => {}
        Err(e) => return failed(&seed.dataset_id, e),
    }

    let bytes = match tokio::fs::read(&seed.path).await {
        Ok(bytes) => bytes,
        Err(e) => {
            return failed(
                &seed.dataset_id,
                format!("cannot read {}: {e}", seed.path.display()),
            );
        }
    };

    let filename = fixture_name(&seed.path);
    let upload = match tabula_ingest::normalize(&filename, &bytes) {
        Ok(upload) => upload,
        Err(e) => return failed(&seed.dataset_id, e),
    };

    let dataset =
        NewDataset::new(filename, upload.file_type, upload.rows).with_id(&seed.dataset_id);

    match store.insert_dataset(dataset).await {
        Ok(Some(summary)) => {
            info!(
                dataset_id = %summary.id,
                rows = summary.row_count,
                "Default dataset seeded"
            );
            SeedOutcome::Seeded {
                dataset_id: summary.id,
                rows: summary.row_count,
            }
        }
        // Lost a race with another process seeding the same ID.
        Ok(None) => SeedOutcome::AlreadyPresent,
        Err(e) => failed(&seed.dataset_id, e),
    }
}

fn fixture_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn failed(dataset_id: &str, reason: impl fmt::Display) -> SeedOutcome {
    let reason = reason.to_string();
    warn!(dataset_id = %dataset_id, error = %reason, "Default dataset not seeded");
    SeedOutcome::Failed(reason)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InMemoryStore;
    use std::path::PathBuf;
    use tabula_core::FileType;

    fn seed_config(path: PathBuf) -> SeedConfig {
        SeedConfig {
            enabled: true,
            dataset_id: "default".into(),
            path,
        }
    }

    fn write_fixture(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[tokio::test]
    async fn seeds_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(&dir, "staff.csv", "name,dept\nAlice,HR\nBob,Eng\n");
        let store = InMemoryStore::new();
        let seed = seed_config(path);

        let first = bootstrap(&store, &seed).await.unwrap();
        assert_eq!(
            first,
            SeedOutcome::Seeded {
                dataset_id: "default".into(),
                rows: 2
            }
        );
        let second = bootstrap(&store, &seed).await.unwrap();
        assert_eq!(second, SeedOutcome::AlreadyPresent);

        assert_eq!(store.count().await.unwrap(), 1);
        let ds = store.get_dataset("default").await.unwrap().unwrap();
        assert_eq!(ds.name, "staff.csv");
        assert_eq!(ds.file_type, FileType::Csv);
    }

    #[tokio::test]
    async fn disabled_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(&dir, "staff.csv", "name\nAlice\n");
        let store = InMemoryStore::new();
        let seed = SeedConfig {
            enabled: false,
            ..seed_config(path)
        };

        assert_eq!(bootstrap(&store, &seed).await.unwrap(), SeedOutcome::Disabled);
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn missing_fixture_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let store = InMemoryStore::new();
        let seed = seed_config(dir.path().join("absent.csv"));

        let outcome = bootstrap(&store, &seed).await.unwrap();
        assert!(matches!(outcome, SeedOutcome::Failed(_)));
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn unparseable_fixture_creates_no_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(&dir, "broken.json", "{ not json");
        let store = InMemoryStore::new();

        let outcome = bootstrap(&store, &seed_config(path)).await.unwrap();
        match outcome {
            SeedOutcome::Failed(reason) => assert!(reason.contains("broken.json")),
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(!store.dataset_exists("default").await.unwrap());
    }

    #[tokio::test]
    async fn existing_dataset_with_seed_id_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(&dir, "staff.csv", "name\nAlice\n");
        let store = InMemoryStore::new();
        let mine = NewDataset::new(
            "mine.json",
            FileType::Json,
            vec![[("k", "v")].into_iter().collect()],
        )
        .with_id("default");
        store.insert_dataset(mine).await.unwrap();

        let outcome = bootstrap(&store, &seed_config(path)).await.unwrap();
        assert_eq!(outcome, SeedOutcome::AlreadyPresent);
        let ds = store.get_dataset("default").await.unwrap().unwrap();
        assert_eq!(ds.name, "mine.json");
    }

    #[test]
    fn outcome_display() {
        let outcome = SeedOutcome::Seeded {
            dataset_id: "default".into(),
            rows: 10,
        };
        assert_eq!(outcome.to_string(), "seeded dataset 'default' (10 rows)");
    }
}
