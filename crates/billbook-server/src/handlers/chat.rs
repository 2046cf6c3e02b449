//! Chat handler: questions about a month's bills

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    Json,
};
use serde::Serialize;
use serde_json::Value;

use super::{month_or_current, read_json, str_field};
use crate::{AppError, AppState};

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
}

/// POST /api/chat - Ask the assistant about the month's bills
pub async fn chat(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<ChatResponse>, AppError> {
    let body: Value = read_json(request).await?;

    let message = str_field(&body, "message")
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .ok_or_else(|| AppError::bad_request("'message' is required"))?;

    let month = month_or_current(str_field(&body, "month"))?;
    let summary = state.store.get_monthly_summary(&month)?;

    let reply = state.assistant.ask(message, &summary).await?;
    Ok(Json(ChatResponse { reply }))
}
