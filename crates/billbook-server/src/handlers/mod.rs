//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod bills;
pub mod chat;
pub mod health;

// Re-export all handlers for use in router
pub use bills::*;
pub use chat::*;
pub use health::*;

use axum::{extract::Request, http::Uri, response::IntoResponse};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::{AppError, MAX_BODY_SIZE};
use billbook_core::MonthKey;

/// Fallback for unknown routes
pub async fn not_found(uri: Uri) -> impl IntoResponse {
    debug!("No route for {}", uri.path());
    AppError::not_found("Not found")
}

/// Read and parse a JSON request body; an empty body reads as `{}`
pub(crate) async fn read_json<T: DeserializeOwned>(request: Request) -> Result<T, AppError> {
    let bytes = axum::body::to_bytes(request.into_body(), MAX_BODY_SIZE)
        .await
        .map_err(|_| AppError::bad_request("Invalid request body"))?;
    let body: &[u8] = if bytes.iter().all(u8::is_ascii_whitespace) {
        b"{}"
    } else {
        &bytes[..]
    };
    serde_json::from_slice(body)
        .map_err(|e| AppError::bad_request(&format!("Invalid JSON: {}", e)))
}

/// String value of a body field; other types count as absent
pub(crate) fn str_field<'a>(body: &'a Value, key: &str) -> Option<&'a str> {
    body.get(key).and_then(Value::as_str)
}

/// Parse an optional `month` parameter; blank counts as absent
pub(crate) fn parse_month(month: Option<&str>) -> Result<Option<MonthKey>, AppError> {
    match month.map(str::trim).filter(|m| !m.is_empty()) {
        Some(m) => Ok(Some(m.parse::<MonthKey>()?)),
        None => Ok(None),
    }
}

/// `month` parameter, defaulting to the current month
pub(crate) fn month_or_current(month: Option<&str>) -> Result<MonthKey, AppError> {
    Ok(parse_month(month)?.unwrap_or_else(MonthKey::current))
}
