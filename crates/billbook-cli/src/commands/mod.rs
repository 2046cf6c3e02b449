//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `ask` - Assistant questions about a month's bills
//! - `bills` - Bill commands (list, add, remove, pay/unpay, summary)
//! - `core` - Core commands (init, status, export) and shared utilities (open_store)
//! - `serve` - Web server command

pub mod ask;
pub mod bills;
pub mod core;
pub mod serve;

// Re-export command functions for main.rs
pub use ask::*;
pub use bills::*;
pub use core::*;
pub use serve::*;

use anyhow::{Context, Result};
use billbook_core::MonthKey;

/// Parse a `--month` argument, defaulting to the current month
pub fn parse_month_arg(month: Option<&str>) -> Result<MonthKey> {
    match month {
        Some(m) => m
            .parse()
            .with_context(|| format!("Invalid --month '{}'", m)),
        None => Ok(MonthKey::current()),
    }
}

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
