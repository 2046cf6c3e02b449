//! Bill, paid status and monthly summary handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{month_or_current, parse_month, read_json, str_field};
use crate::{AppError, AppState};
use billbook_core::{Bill, BillInput, MonthKey, MonthlySummary};

/// Query parameters carrying an optional `YYYY-MM` month
#[derive(Debug, Deserialize)]
pub struct MonthQuery {
    pub month: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaidStatusResponse {
    pub id: String,
    pub month: MonthKey,
    pub is_paid: bool,
}

/// GET /api/bills - List bills, decorated with paid status when `month` is given
pub async fn list_bills(
    State(state): State<Arc<AppState>>,
    Query(params): Query<MonthQuery>,
) -> Result<Response, AppError> {
    match parse_month(params.month.as_deref())? {
        Some(month) => Ok(Json(state.store.list_bills_with_status(&month)?).into_response()),
        None => Ok(Json(state.store.list_bills()?).into_response()),
    }
}

/// GET /api/bills/:id - Get a single bill
pub async fn get_bill(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Bill>, AppError> {
    let bill = state
        .store
        .get_bill(&id)?
        .ok_or_else(|| AppError::not_found("Bill not found"))?;
    Ok(Json(bill))
}

/// POST /api/bills - Create a bill
pub async fn create_bill(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<(StatusCode, Json<Bill>), AppError> {
    let body: Value = read_json(request).await?;
    let bill = BillInput::from_json(&body)?.into_new_bill()?;
    let bill = state.store.upsert_bill(bill)?;
    Ok((StatusCode::CREATED, Json(bill)))
}

/// PUT /api/bills/:id - Update a bill, keeping fields the payload omits
pub async fn update_bill(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    request: Request,
) -> Result<Json<Bill>, AppError> {
    let existing = state.store.require_bill(&id)?;

    let body: Value = read_json(request).await?;
    let bill = BillInput::from_json(&body)?
        .merged_over(&existing)
        .into_bill(existing.id)?;
    Ok(Json(state.store.upsert_bill(bill)?))
}

/// DELETE /api/bills/:id - Delete a bill and its paid history
pub async fn delete_bill(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if !state.store.delete_bill(&id)? {
        return Err(AppError::not_found("Bill not found"));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/bills/:id/paid - Mark or unmark a bill as paid for a month
pub async fn set_paid_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    request: Request,
) -> Result<Json<PaidStatusResponse>, AppError> {
    state.store.require_bill(&id)?;

    let body: Value = read_json(request).await?;
    let month = parse_month(str_field(&body, "month"))?
        .ok_or_else(|| AppError::bad_request("'month' is required"))?;
    let is_paid = body.get("isPaid").map_or(false, is_truthy);

    let is_paid = state.store.set_paid_status(&month, &id, is_paid)?;
    Ok(Json(PaidStatusResponse { id, month, is_paid }))
}

/// Loose truthiness for `isPaid`: `false`, `0`, `""` and `null` are unpaid
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(false, |n| n != 0.0 && !n.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// GET /api/summary - Totals and decorated bills for a month
pub async fn get_summary(
    State(state): State<Arc<AppState>>,
    Query(params): Query<MonthQuery>,
) -> Result<Json<MonthlySummary>, AppError> {
    let month = month_or_current(params.month.as_deref())?;
    Ok(Json(state.store.get_monthly_summary(&month)?))
}
