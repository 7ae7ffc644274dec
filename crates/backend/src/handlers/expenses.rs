use axum::extract::Path;
use axum::http::StatusCode;
use axum::Json;
use serde_json::Value;

use contracts::domain::expenses::{ExpenseListResponse, ExpenseRecord};

use crate::domain::expenses::service;
use crate::shared::error::ApiError;

fn parse_expense_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| ApiError::BadRequest("Invalid expense id.".to_string()))
}

/// GET /api/expenses
pub async fn list_all() -> Result<Json<ExpenseListResponse>, ApiError> {
    match service::list().await {
        Ok(response) => Ok(Json(response)),
        Err(e) => {
            tracing::error!("Failed to list expenses: {}", e);
            Err(e)
        }
    }
}

/// POST /api/expenses
pub async fn create(
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<ExpenseRecord>), ApiError> {
    let insert = service::parse_create_body(&body)?;
    match service::create(insert).await {
        Ok(record) => Ok((StatusCode::CREATED, Json(record))),
        Err(e) => {
            tracing::error!("Failed to create expense: {}", e);
            Err(e)
        }
    }
}

/// PATCH /api/expenses/:id
pub async fn update(
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<ExpenseRecord>, ApiError> {
    let expense_id = parse_expense_id(&id)?;
    let patch = service::parse_update_body(&body)?;
    match service::update(expense_id, &patch).await {
        Ok(record) => Ok(Json(record)),
        Err(e) => {
            tracing::error!("Failed to update expense {}: {}", expense_id, e);
            Err(e)
        }
    }
}
