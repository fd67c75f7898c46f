//! `tabula rows` — Print the stored rows of one dataset.

use tabula_core::Error;
use tabula_core::store::DatasetStore;

use super::{CommandResult, Runtime};

pub async fn run(runtime: &Runtime, dataset_id: &str, limit: Option<usize>) -> CommandResult {
    let Some(dataset) = runtime.store.get_dataset(dataset_id).await? else {
        return Err(Error::DatasetNotFound {
            dataset_id: dataset_id.to_string(),
        }
        .into());
    };

    let rows = runtime.store.fetch_rows(&dataset.id).await?;
    let shown = limit.unwrap_or(rows.len()).min(rows.len());

    println!("📄 {} ({} rows)", dataset.name, dataset.row_count);
    for row in rows.iter().take(shown) {
        println!("  Row {}: {}", row.row_index, row.fields.to_json());
    }
    if shown < rows.len() {
        println!("  … {} more", rows.len() - shown);
    }
    Ok(())
}
