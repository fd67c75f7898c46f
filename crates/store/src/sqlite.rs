//! SQLite dataset store.
//!
//! Uses a single SQLite database file with two tables:
//! - `datasets` — one metadata record per ingested file
//! - `records`  — one row per dataset row, unique on `(dataset_id, row_index)`
//!
//! A dataset and its records are written in one transaction, so readers
//! (WAL mode) see either the whole dataset or nothing.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row as _, SqlitePool};
use std::path::Path;
use std::time::Duration;
use tabula_config::StorageConfig;
use tabula_core::error::StoreError;
use tabula_core::store::DatasetStore;
use tabula_core::{Dataset, FileType, Fields, NewDataset, Row};
use tracing::{debug, info};

const DATASET_COLUMNS: &str = "id, name, file_type, row_count, created_at";

/// A production SQLite dataset store.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if missing) the database file at `path`.
    ///
    /// Does not create tables; call [`DatasetStore::initialize`] once at
    /// startup.
    pub async fn connect(path: &Path, max_connections: u32) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                StoreError::Connection(format!("Cannot create {}: {e}", parent.display()))
            })?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(|e| {
                StoreError::Connection(format!("Failed to open SQLite at {}: {e}", path.display()))
            })?;

        info!(path = %path.display(), "SQLite dataset store opened");
        Ok(Self { pool })
    }

    pub async fn from_config(config: &StorageConfig) -> Result<Self, StoreError> {
        Self::connect(&config.path, config.max_connections).await
    }

    /// Create from an existing pool (useful for testing).
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Close every pooled connection.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    fn row_to_dataset(row: &sqlx::sqlite::SqliteRow) -> Result<Dataset, StoreError> {
        let id: String = row
            .try_get("id")
            .map_err(|e| StoreError::QueryFailed(format!("id column: {e}")))?;
        let name: String = row
            .try_get("name")
            .map_err(|e| StoreError::QueryFailed(format!("name column: {e}")))?;
        let file_type_str: String = row
            .try_get("file_type")
            .map_err(|e| StoreError::QueryFailed(format!("file_type column: {e}")))?;
        let row_count: i64 = row
            .try_get("row_count")
            .map_err(|e| StoreError::QueryFailed(format!("row_count column: {e}")))?;
        let created_at_str: String = row
            .try_get("created_at")
            .map_err(|e| StoreError::QueryFailed(format!("created_at column: {e}")))?;

        let file_type = file_type_str
            .parse::<FileType>()
            .map_err(|e| StoreError::Corrupt(format!("dataset {id}: {e}")))?;

        let row_count = usize::try_from(row_count)
            .map_err(|_| StoreError::Corrupt(format!("dataset {id}: row_count {row_count}")))?;

        let created_at = DateTime::parse_from_rfc3339(&created_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| StoreError::Corrupt(format!("dataset {id}: created_at: {e}")))?;

        Ok(Dataset {
            id,
            name,
            file_type,
            row_count,
            created_at,
        })
    }

    /// RFC 3339 with fixed microsecond precision, so text order is time order.
    fn timestamp(at: &DateTime<Utc>) -> String {
        at.to_rfc3339_opts(SecondsFormat::Micros, true)
    }
}

#[async_trait]
impl DatasetStore for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn initialize(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS datasets (
                id          TEXT PRIMARY KEY NOT NULL,
                name        TEXT NOT NULL,
                file_type   TEXT NOT NULL,
                row_count   INTEGER NOT NULL,
                created_at  TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::MigrationFailed(format!("datasets table: {e}")))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS records (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                dataset_id  TEXT NOT NULL REFERENCES datasets(id),
                row_index   INTEGER NOT NULL,
                fields_json TEXT NOT NULL,
                text        TEXT NOT NULL,
                UNIQUE (dataset_id, row_index)
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::MigrationFailed(format!("records table: {e}")))?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_records_dataset ON records(dataset_id)")
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::MigrationFailed(format!("dataset_id index: {e}")))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_datasets_created_at ON datasets(created_at DESC)",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::MigrationFailed(format!("created_at index: {e}")))?;

        debug!("SQLite schema ready");
        Ok(())
    }

    async fn insert_dataset(&self, dataset: NewDataset) -> Result<Option<Dataset>, StoreError> {
        let summary = dataset.summary();

        // Rolled back on drop if any statement below fails.
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreError::Connection(format!("begin transaction: {e}")))?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO datasets (id, name, file_type, row_count, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(id) DO NOTHING
            "#,
        )
        .bind(&summary.id)
        .bind(&summary.name)
        .bind(summary.file_type.as_str())
        .bind(summary.row_count as i64)
        .bind(Self::timestamp(&summary.created_at))
        .execute(&mut *tx)
        .await
        .map_err(|e| StoreError::WriteFailed(format!("dataset {}: {e}", summary.id)))?;

        if inserted.rows_affected() == 0 {
            tx.rollback()
                .await
                .map_err(|e| StoreError::WriteFailed(format!("rollback: {e}")))?;
            debug!(dataset_id = %summary.id, "Dataset already exists, nothing written");
            return Ok(None);
        }

        for (row_index, fields) in dataset.rows.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO records (dataset_id, row_index, fields_json, text)
                VALUES (?1, ?2, ?3, ?4)
                "#,
            )
            .bind(&summary.id)
            .bind(row_index as i64)
            .bind(fields.to_json())
            .bind(fields.to_text())
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                StoreError::WriteFailed(format!("dataset {} row {row_index}: {e}", summary.id))
            })?;
        }

        tx.commit()
            .await
            .map_err(|e| StoreError::WriteFailed(format!("commit dataset {}: {e}", summary.id)))?;

        info!(
            dataset_id = %summary.id,
            name = %summary.name,
            rows = summary.row_count,
            "Dataset stored"
        );
        Ok(Some(summary))
    }

    async fn list_datasets(&self) -> Result<Vec<Dataset>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {DATASET_COLUMNS} FROM datasets ORDER BY created_at DESC, rowid DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::QueryFailed(format!("list datasets: {e}")))?;

        rows.iter().map(Self::row_to_dataset).collect()
    }

    async fn get_dataset(&self, id: &str) -> Result<Option<Dataset>, StoreError> {
        let row = sqlx::query(&format!("SELECT {DATASET_COLUMNS} FROM datasets WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::QueryFailed(format!("get dataset {id}: {e}")))?;

        row.as_ref().map(Self::row_to_dataset).transpose()
    }

    async fn dataset_exists(&self, id: &str) -> Result<bool, StoreError> {
        let row = sqlx::query("SELECT 1 FROM datasets WHERE id = ?1 LIMIT 1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::QueryFailed(format!("dataset exists {id}: {e}")))?;

        Ok(row.is_some())
    }

    async fn latest_dataset_id(&self) -> Result<Option<String>, StoreError> {
        let row = sqlx::query("SELECT id FROM datasets ORDER BY created_at DESC, rowid DESC LIMIT 1")
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::QueryFailed(format!("latest dataset: {e}")))?;

        row.map(|r| {
            r.try_get::<String, _>("id")
                .map_err(|e| StoreError::QueryFailed(format!("id column: {e}")))
        })
        .transpose()
    }

    async fn fetch_rows(&self, id: &str) -> Result<Vec<Row>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT row_index, fields_json
            FROM records
            WHERE dataset_id = ?1
            ORDER BY row_index ASC
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::QueryFailed(format!("fetch rows {id}: {e}")))?;

        rows.iter()
            .map(|r| {
                let row_index: i64 = r
                    .try_get("row_index")
                    .map_err(|e| StoreError::QueryFailed(format!("row_index column: {e}")))?;
                let fields_json: String = r
                    .try_get("fields_json")
                    .map_err(|e| StoreError::QueryFailed(format!("fields_json column: {e}")))?;
                let fields: Fields = serde_json::from_str(&fields_json).map_err(|e| {
                    StoreError::Corrupt(format!("dataset {id} row {row_index}: {e}"))
                })?;
                let row_index = usize::try_from(row_index).map_err(|_| {
                    StoreError::Corrupt(format!("dataset {id}: row_index {row_index}"))
                })?;
                Ok(Row::new(id, row_index, fields))
            })
            .collect()
    }

    async fn count(&self) -> Result<usize, StoreError> {
        let row = sqlx::query("SELECT COUNT(*) AS cnt FROM datasets")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::QueryFailed(format!("COUNT: {e}")))?;

        let cnt: i64 = row
            .try_get("cnt")
            .map_err(|e| StoreError::QueryFailed(format!("cnt column: {e}")))?;

        Ok(cnt as usize)
    }
}
