//! Assistant command implementation

use anyhow::{Context, Result};
use billbook_core::{AIBackend, BillStore, BillsAssistant};

use super::parse_month_arg;

pub async fn cmd_ask(
    store: &BillStore,
    assistant: &BillsAssistant,
    question: &str,
    month: Option<&str>,
) -> Result<()> {
    let month = parse_month_arg(month)?;
    let summary = store
        .get_monthly_summary(&month)
        .context("Failed to build summary")?;

    if let Some(client) = assistant.client() {
        println!("🤖 Asking {} about {}...", client.model(), month);
    }

    let reply = assistant
        .ask(question, &summary)
        .await
        .context("Assistant request failed")?;

    println!();
    println!("{}", reply);
    Ok(())
}
