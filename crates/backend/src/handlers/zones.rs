use axum::extract::Path;
use axum::Json;
use serde_json::{json, Value};

use contracts::domain::objects::{CreateZoneBody, ObjectRecord, PinUserToZoneBody};

use crate::domain::objects::service;
use crate::shared::error::ApiError;

/// GET /api/zones
pub async fn list_all() -> Json<Vec<ObjectRecord>> {
    Json(service::list_zones().await)
}

/// POST /api/zones
pub async fn create(Json(body): Json<CreateZoneBody>) -> Result<Json<Value>, ApiError> {
    let data = service::create_zone(body).await?;
    Ok(Json(json!({ "success": true, "data": data })))
}

/// DELETE /api/zones/:id
pub async fn delete(Path(id): Path<String>) -> Result<Json<Value>, ApiError> {
    let zone_id = id
        .parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| ApiError::BadRequest("Zone ID is required".to_string()))?;

    service::delete_zone(zone_id).await?;
    Ok(Json(json!({ "success": true })))
}

/// PATCH /api/zones/pin
pub async fn pin(Json(body): Json<PinUserToZoneBody>) -> Result<Json<Value>, ApiError> {
    let message = service::pin_user_to_zone(body).await?;
    Ok(Json(json!({ "success": true, "message": message })))
}
