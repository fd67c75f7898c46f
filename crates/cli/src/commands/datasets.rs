//! `tabula datasets` — List stored datasets, newest first.

use super::{CommandResult, Runtime};

pub async fn run(runtime: &Runtime, json: bool) -> CommandResult {
    let datasets = runtime.assistant()?.list_datasets().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&datasets)?);
        return Ok(());
    }

    if datasets.is_empty() {
        println!("No datasets yet — run `tabula ingest <FILE>` first");
        return Ok(());
    }

    println!("📚 {} dataset(s)", datasets.len());
    println!();
    for ds in &datasets {
        println!(
            "  {:<38} {:<5} {:>7} rows  {}  {}",
            ds.id,
            ds.file_type.as_str(),
            ds.row_count,
            ds.created_at.format("%Y-%m-%d %H:%M:%S"),
            ds.name
        );
    }
    Ok(())
}
