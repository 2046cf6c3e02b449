//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_store` - Shared utility to open the bills file
//! - `cmd_init` - Create the bills file
//! - `cmd_status` - Show data file and assistant status
//! - `cmd_export` - Print the bills document

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use billbook_core::{AIBackend, BillStore, BillsAssistant, MonthKey};

/// Default bills file: `<platform data dir>/billbook/bills.json`
pub fn default_data_path() -> Result<PathBuf> {
    let dir = dirs::data_dir().context("Could not determine the platform data directory")?;
    Ok(dir.join("billbook").join("bills.json"))
}

/// `--data` if given, otherwise the default location
pub fn resolve_data_path(data: Option<&Path>) -> Result<PathBuf> {
    match data {
        Some(path) => Ok(path.to_path_buf()),
        None => default_data_path(),
    }
}

/// Open the bills store, creating its directory if needed
pub fn open_store(data_path: &Path) -> Result<BillStore> {
    BillStore::open(data_path)
        .with_context(|| format!("Failed to open bills file {}", data_path.display()))
}

pub fn cmd_init(data_path: &Path) -> Result<()> {
    println!("🔧 Initializing bills file at {}...", data_path.display());

    let store = open_store(data_path)?;
    if store.init().context("Failed to write bills file")? {
        println!("✅ Bills file created!");
    } else {
        let count = store.list_bills().context("Failed to read bills file")?.len();
        println!("✅ Bills file already exists ({} bills)", count);
    }

    println!();
    println!("Next steps:");
    println!("  1. Add a bill: billbook add --name Rent --due-day 1 --amount 1200");
    println!("  2. Start web UI: billbook serve");

    Ok(())
}

pub fn cmd_status(data_path: &Path) -> Result<()> {
    println!();
    println!("📊 Billbook Status");
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   Data file: {}", data_path.display());

    if data_path.exists() {
        if let Ok(metadata) = std::fs::metadata(data_path) {
            println!("   Size: {:.1} KB", metadata.len() as f64 / 1024.0);
        }

        let store = open_store(data_path)?;
        match store.document() {
            Ok(doc) => {
                let recurring = doc.bills.iter().filter(|b| b.is_recurring).count();
                println!();
                println!(
                    "   Bills: {} ({} recurring, {} one-time)",
                    doc.bills.len(),
                    recurring,
                    doc.bills.len() - recurring
                );
                println!("   Months with payments: {}", doc.paid_status.len());

                let month = MonthKey::current();
                let summary = store.get_monthly_summary(&month)?;
                println!(
                    "   {}: ${:.2} paid, ${:.2} remaining",
                    month, summary.totals.paid, summary.totals.remaining
                );
            }
            Err(e) => {
                println!();
                println!("   ❌ Error reading bills file: {}", e);
            }
        }
    } else {
        println!("   Size: (not initialized, run `billbook init`)");
    }

    println!();
    match BillsAssistant::from_env().client() {
        Some(client) => println!(
            "   🤖 Assistant: {} at {} (model: {})",
            client.backend_name(),
            client.host(),
            client.model()
        ),
        None => println!("   💡 Assistant: not configured (set OPENAI_API_KEY or AI_BACKEND=ollama)"),
    }

    println!();
    Ok(())
}

/// Print the full document as pretty JSON on stdout
pub fn cmd_export(store: &BillStore) -> Result<()> {
    let doc = store.document().context("Failed to read bills file")?;
    println!("{}", serde_json::to_string_pretty(&doc)?);
    Ok(())
}
