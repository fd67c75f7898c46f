//! `tabula ask` — Answer a question from a dataset.

use tracing::warn;

use super::{CommandResult, Runtime};

pub async fn run(
    runtime: &Runtime,
    question: &str,
    dataset_id: Option<&str>,
    json: bool,
) -> CommandResult {
    let assistant = runtime.assistant()?;

    // Dropping the ask future aborts any in-flight generation request.
    let answer = tokio::select! {
        answer = assistant.ask(question, dataset_id) => answer?,
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted, generation request cancelled");
            return Err("interrupted".into());
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&answer)?);
        return Ok(());
    }

    println!("{}", answer.answer);
    println!();
    let sources: Vec<String> = answer.sources.iter().map(|s| s.to_string()).collect();
    println!("  Dataset:  {}", answer.dataset_id);
    println!(
        "  Sources:  {}",
        if sources.is_empty() {
            "(none)".to_string()
        } else {
            format!("rows {}", sources.join(", "))
        }
    );
    Ok(())
}
