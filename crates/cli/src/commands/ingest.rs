//! `tabula ingest` — Upload a CSV or JSON file as a new dataset.

use std::path::Path;

use super::{CommandResult, Runtime};

pub async fn run(runtime: &Runtime, file: &Path, name: Option<String>) -> CommandResult {
    let bytes = tokio::fs::read(file)
        .await
        .map_err(|e| format!("Cannot read {}: {e}", file.display()))?;

    let filename = name.unwrap_or_else(|| {
        file.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    });

    let dataset = runtime.assistant()?.ingest(&filename, &bytes).await?;

    println!("📥 Ingested {}", dataset.name);
    println!("  ID:        {}", dataset.id);
    println!("  Type:      {}", dataset.file_type);
    println!("  Rows:      {}", dataset.row_count);
    println!("  Created:   {}", dataset.created_at.to_rfc3339());
    Ok(())
}
