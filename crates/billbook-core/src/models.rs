//! Domain models for Billbook

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{de, Deserialize, Deserializer, Serialize};

use crate::month::MonthKey;

/// A recurring or one-time payment obligation
///
/// Paid/unpaid is not stored here: it is month-scoped and lives in
/// [`BillsDocument::paid_status`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    pub id: String,
    pub name: String,
    /// Nominal day of month (1-31) the bill falls due
    #[serde(deserialize_with = "deserialize_due_day")]
    pub due_day: u32,
    pub amount: f64,
    #[serde(default)]
    pub notes: String,
    /// Records written before this field existed are recurring
    #[serde(default = "default_is_recurring")]
    pub is_recurring: bool,
}

fn default_is_recurring() -> bool {
    true
}

/// Older files may hold any JSON number here (e.g. `15.5`); round and clamp to 1-31
fn deserialize_due_day<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    if !raw.is_finite() {
        return Err(de::Error::custom("dueDay must be a finite number"));
    }
    Ok(raw.round().clamp(1.0, 31.0) as u32)
}

/// A bill decorated with its concrete due date and paid flag for one month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillWithStatus {
    #[serde(flatten)]
    pub bill: Bill,
    pub is_paid: bool,
    /// ISO date (`YYYY-MM-DD`)
    pub due_date: NaiveDate,
    /// Display date (`MM/DD/YYYY`)
    pub due_date_label: String,
}

/// Roll-up of bill amounts for one month
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyTotals {
    pub total_due: f64,
    pub recurring_due: f64,
    pub one_time_due: f64,
    pub paid: f64,
    pub paid_recurring: f64,
    pub remaining: f64,
    pub remaining_recurring: f64,
}

/// Decorated bills plus totals for a month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlySummary {
    pub month: MonthKey,
    pub bills: Vec<BillWithStatus>,
    pub totals: MonthlyTotals,
}

/// Paid flags for a single month: bill id -> `true`
///
/// Sparse: an absent id means unpaid. `false` is never stored.
pub type MonthPaidStatus = BTreeMap<String, bool>;

/// The persisted document
///
/// Layout on disk: `{ "bills": [...], "paidStatus": { "YYYY-MM": { "<id>": true } } }`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillsDocument {
    #[serde(default)]
    pub bills: Vec<Bill>,
    #[serde(default)]
    pub paid_status: BTreeMap<String, MonthPaidStatus>,
}

impl BillsDocument {
    /// Whether `id` is marked paid in `month`
    pub fn is_paid(&self, month: &MonthKey, id: &str) -> bool {
        self.paid_status
            .get(&month.to_string())
            .and_then(|status| status.get(id))
            .copied()
            .unwrap_or(false)
    }
}
