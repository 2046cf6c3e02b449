//! Billbook Core Library
//!
//! Shared functionality for the Billbook household bills tracker:
//! - Bill model and the JSON file-backed store
//! - Month keys and due date normalization
//! - Monthly aggregation (due, paid, remaining, recurring vs one-time)
//! - Bill payload validation
//! - Pluggable language model backends (OpenAI-compatible, Ollama)
//! - Bills assistant for natural-language questions

pub mod ai;
pub mod assistant;
pub mod error;
pub mod models;
pub mod month;
pub mod store;
pub mod summary;
pub mod validate;

/// Test utilities including a mock language model server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use ai::{AIBackend, AIClient, MockBackend, OllamaBackend, OpenAICompatibleBackend};
pub use assistant::BillsAssistant;
pub use error::{Error, Result};
pub use models::{Bill, BillWithStatus, BillsDocument, MonthlySummary, MonthlyTotals};
pub use month::MonthKey;
pub use store::BillStore;
pub use validate::{generate_bill_id, BillInput};
