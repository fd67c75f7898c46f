//! Dataset domain types.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::row::Fields;

/// Source format of an uploaded dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Csv,
    Json,
}

impl FileType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::Csv => "csv",
            FileType::Json => "json",
        }
    }

    /// Select the format from a filename's extension (case-insensitive).
    pub fn from_filename(filename: &str) -> Option<Self> {
        let lower = filename.to_lowercase();
        if lower.ends_with(".csv") {
            Some(FileType::Csv)
        } else if lower.ends_with(".json") {
            Some(FileType::Json)
        } else {
            None
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "csv" => Ok(FileType::Csv),
            "json" => Ok(FileType::Json),
            other => Err(format!("unknown file type '{other}'")),
        }
    }
}

/// A stored dataset. Immutable once created.
///
/// This is also the summary handed back from ingest and listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    /// Opaque unique ID
    pub id: String,

    /// Display name (the uploaded filename)
    pub name: String,

    pub file_type: FileType,

    /// Always equals the number of persisted rows
    pub row_count: usize,

    pub created_at: DateTime<Utc>,
}

/// A dataset about to be written: metadata plus every row, in file order.
#[derive(Debug, Clone)]
pub struct NewDataset {
    pub id: String,
    pub name: String,
    pub file_type: FileType,
    pub created_at: DateTime<Utc>,
    pub rows: Vec<Fields>,
}

impl NewDataset {
    /// Fresh UUID and creation time.
    ///
    /// The timestamp is truncated to microseconds, the precision it is
    /// persisted with.
    pub fn new(name: impl Into<String>, file_type: FileType, rows: Vec<Fields>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            file_type,
            created_at: Utc::now().trunc_subsecs(6),
            rows,
        }
    }

    /// Use a caller-chosen ID (the well-known seed dataset).
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn summary(&self) -> Dataset {
        Dataset {
            id: self.id.clone(),
            name: self.name.clone(),
            file_type: self.file_type,
            row_count: self.rows.len(),
            created_at: self.created_at,
        }
    }
}
