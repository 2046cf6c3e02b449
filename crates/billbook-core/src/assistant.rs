//! Bills assistant
//!
//! Answers free-text questions about a month's bills by sending the monthly
//! summary and the question to the configured language model. Every failure
//! (not configured, provider error, empty reply) surfaces as
//! [`Error::AiUnavailable`]; nothing is retried.

use std::fmt::Write;

use tracing::{info, warn};

use crate::ai::{AIBackend, AIClient};
use crate::error::{Error, Result};
use crate::models::MonthlySummary;

/// Instructions sent as the system prompt with every question
pub const SYSTEM_PROMPT: &str = "You are Billbook, an assistant that answers questions about a \
household's bills. Base every answer only on the bill data provided. Point out what is due, \
what is paid and what remains when it helps. Keep answers short and actionable.";

/// Message used when no backend is configured
pub const NOT_CONFIGURED: &str =
    "language model is not configured (set OPENAI_API_KEY, OPENAI_BASE_URL or OLLAMA_HOST)";

/// Question-answering front end over an optional AI backend
#[derive(Clone, Default)]
pub struct BillsAssistant {
    client: Option<AIClient>,
}

impl BillsAssistant {
    pub fn new(client: Option<AIClient>) -> Self {
        Self { client }
    }

    /// Build from `AI_BACKEND` and related environment variables
    pub fn from_env() -> Self {
        Self::new(AIClient::from_env())
    }

    /// Whether a backend is configured
    pub fn is_available(&self) -> bool {
        self.client.is_some()
    }

    pub fn client(&self) -> Option<&AIClient> {
        self.client.as_ref()
    }

    /// Ask a question about the bills in `summary`
    pub async fn ask(&self, question: &str, summary: &MonthlySummary) -> Result<String> {
        let question = question.trim();
        if question.is_empty() {
            return Err(Error::Validation(vec!["'message' is required".to_string()]));
        }

        let client = self
            .client
            .as_ref()
            .ok_or_else(|| Error::AiUnavailable(NOT_CONFIGURED.to_string()))?;

        let prompt = build_prompt(question, summary);
        info!(
            backend = client.backend_name(),
            model = client.model(),
            month = %summary.month,
            bills = summary.bills.len(),
            "Asking bills assistant"
        );

        let reply = match client.complete(SYSTEM_PROMPT, &prompt).await {
            Ok(reply) => reply,
            Err(Error::AiUnavailable(message)) => {
                warn!(error = %message, "Bills assistant request failed");
                return Err(Error::AiUnavailable(message));
            }
            Err(e) => {
                warn!(error = %e, "Bills assistant request failed");
                return Err(Error::AiUnavailable(e.to_string()));
            }
        };

        let reply = reply.trim();
        if reply.is_empty() {
            warn!(model = client.model(), "Bills assistant returned no text");
            return Err(Error::AiUnavailable(format!(
                "No text returned from {}",
                client.model()
            )));
        }

        Ok(reply.to_string())
    }
}

/// Render the user prompt: month, totals, one line per bill, then the question
pub fn build_prompt(question: &str, summary: &MonthlySummary) -> String {
    let totals = &summary.totals;
    let mut prompt = String::new();

    // Writing to a String cannot fail
    let _ = writeln!(prompt, "Month: {}", summary.month);
    let _ = writeln!(prompt, "Total due: {}", money(totals.total_due));
    let _ = writeln!(prompt, "Recurring due: {}", money(totals.recurring_due));
    let _ = writeln!(prompt, "One-time due: {}", money(totals.one_time_due));
    let _ = writeln!(prompt, "Paid so far: {}", money(totals.paid));
    let _ = writeln!(prompt, "Remaining: {}", money(totals.remaining));
    let _ = writeln!(
        prompt,
        "Remaining recurring: {}",
        money(totals.remaining_recurring)
    );

    prompt.push_str("Bills:\n");
    if summary.bills.is_empty() {
        prompt.push_str("(none)\n");
    }
    for entry in &summary.bills {
        let _ = writeln!(
            prompt,
            "- {} (due {}) for {} - {} ({})",
            entry.bill.name,
            entry.bill.due_day,
            money(entry.bill.amount),
            if entry.is_paid { "paid" } else { "unpaid" },
            if entry.bill.is_recurring {
                "recurring"
            } else {
                "one-time"
            },
        );
    }

    let _ = write!(prompt, "\nQuestion: {}", question);
    prompt
}

/// Dollar amount with two decimals
pub fn money(amount: f64) -> String {
    format!("${:.2}", amount)
}
