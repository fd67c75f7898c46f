//! `tabula init` — Create the schema and seed the default dataset.

use tabula_core::store::DatasetStore;
use tabula_store::SeedOutcome;

use super::{CommandResult, Runtime};

pub async fn run(runtime: &Runtime) -> CommandResult {
    let count = runtime.store.count().await?;

    println!("🗂️  Tabula initialized");
    println!("=====================");
    println!("  Database:  {}", runtime.config.storage.path.display());
    println!("  Datasets:  {count}");

    match &runtime.seed {
        SeedOutcome::Seeded { dataset_id, rows } => {
            println!("\n  ✅ Seeded '{dataset_id}' with {rows} rows");
        }
        SeedOutcome::AlreadyPresent => {
            println!("\n  ✅ Default dataset '{}' present", runtime.config.seed.dataset_id);
        }
        SeedOutcome::Disabled => println!("\n  ⏭️  Seeding disabled"),
        SeedOutcome::Failed(reason) => println!("\n  ⚠️  Seeding failed: {reason}"),
    }

    Ok(())
}
