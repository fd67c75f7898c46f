//! Upload normalization for Tabula.
//!
//! Turns raw uploaded bytes into canonical, ordered, string-valued rows.
//! The format is chosen by filename extension only:
//!
//! - `.csv`: header line + one row per line, values kept verbatim
//! - `.json`: a list of objects, a single object, or `{"records": [...]}`
//!
//! Anything that yields zero rows is rejected, so a dataset is never
//! created empty.

mod csv_rows;
mod json_rows;

use tabula_core::error::IngestError;
use tabula_core::{FileType, Fields};
use tracing::{info, warn};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Normalized content of one upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedUpload {
    pub file_type: FileType,
    /// Rows in file order; position becomes `row_index`.
    pub rows: Vec<Fields>,
}

/// Parse and normalize an uploaded file.
pub fn normalize(filename: &str, bytes: &[u8]) -> Result<NormalizedUpload, IngestError> {
    if filename.trim().is_empty() {
        warn!("Upload rejected: missing filename");
        return Err(IngestError::MissingFilename);
    }

    if bytes.is_empty() {
        warn!(file = %filename, "Upload rejected: empty file");
        return Err(IngestError::EmptyUpload {
            filename: filename.to_string(),
        });
    }

    let file_type =
        FileType::from_filename(filename).ok_or_else(|| IngestError::UnsupportedFormat {
            filename: filename.to_string(),
        })?;

    let content = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let rows = match file_type {
        FileType::Csv => csv_rows::parse(filename, content)?,
        FileType::Json => json_rows::parse(filename, content)?,
    };

    if rows.is_empty() {
        warn!(file = %filename, "Upload rejected: no rows found");
        return Err(IngestError::EmptyDataset {
            filename: filename.to_string(),
        });
    }

    info!(file = %filename, file_type = %file_type, rows = rows.len(), "Upload parsed");
    Ok(NormalizedUpload { file_type, rows })
}

fn malformed(filename: &str, reason: impl std::fmt::Display) -> IngestError {
    IngestError::Malformed {
        filename: filename.to_string(),
        reason: reason.to_string(),
    }
}
