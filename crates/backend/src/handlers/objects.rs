use axum::http::StatusCode;
use axum::Json;
use serde_json::Value;

use contracts::domain::objects::{CreateObjectBody, ObjectListRow};

use crate::domain::objects::service;
use crate::shared::error::ApiError;

/// GET /api/objects
pub async fn list_all() -> Result<Json<Vec<ObjectListRow>>, ApiError> {
    match service::list_objects().await {
        Ok(rows) => Ok(Json(rows)),
        Err(e) => {
            tracing::error!("Failed to list objects: {}", e);
            Err(e)
        }
    }
}

/// POST /api/objects
pub async fn create(
    Json(body): Json<CreateObjectBody>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    match service::create_object(body).await {
        Ok(created) => Ok((StatusCode::CREATED, Json(created))),
        Err(e) => {
            tracing::error!("Failed to create object: {}", e);
            Err(e)
        }
    }
}
