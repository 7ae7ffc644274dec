use contracts::domain::objects::{
    map_object_db_row_to_record, CreateObjectBody, CreateZoneBody, ObjectDbInsert,
    ObjectListRow, ObjectRecord, PinUserToZoneBody, ZoneDbInsert,
};
use serde_json::Value;

use super::repository;
use crate::domain::customers;
use crate::shared::error::ApiError;

fn trimmed(value: Option<&String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub async fn list_objects() -> Result<Vec<ObjectListRow>, ApiError> {
    repository::list_short().await
}

pub async fn create_object(body: CreateObjectBody) -> Result<Value, ApiError> {
    let name = trimmed(body.name.as_ref())
        .ok_or_else(|| ApiError::BadRequest("name is required".to_string()))?;

    let rows = repository::insert(&ObjectDbInsert {
        name,
        description: trimmed(body.description.as_ref()),
        address: trimmed(body.address.as_ref()),
        code: trimmed(body.code.as_ref()),
    })
    .await?;

    rows.into_iter()
        .next()
        .ok_or_else(|| ApiError::Internal("Failed to create object".to_string()))
}

/// Страница зон читает те же objects, но терпима к сбоям выборки:
/// вместо ошибки отдаёт пустой список.
pub async fn list_zones() -> Vec<ObjectRecord> {
    match repository::list_full().await {
        Ok(rows) => rows.into_iter().map(map_object_db_row_to_record).collect(),
        Err(e) => {
            tracing::error!("Error fetching objects: {}", e);
            Vec::new()
        }
    }
}

pub async fn create_zone(body: CreateZoneBody) -> Result<Value, ApiError> {
    let name = trimmed(body.name.as_ref())
        .ok_or_else(|| ApiError::BadRequest("Zone name is required".to_string()))?;

    let rows = repository::insert_zone(&ZoneDbInsert {
        name,
        description: trimmed(body.description.as_ref()),
    })
    .await
    .map_err(|e| {
        tracing::error!("Error creating zone: {}", e);
        ApiError::Internal("Failed to create zone".to_string())
    })?;

    Ok(Value::Array(rows))
}

pub async fn delete_zone(id: i64) -> Result<(), ApiError> {
    repository::delete(id).await.map_err(|e| {
        tracing::error!("Error deleting zone: {}", e);
        ApiError::Internal("Failed to delete zone".to_string())
    })
}

pub async fn pin_user_to_zone(body: PinUserToZoneBody) -> Result<String, ApiError> {
    let user_id = body.user_id.filter(|id| *id > 0);
    let zone_name = trimmed(body.zone_name.as_ref());

    let (user_id, zone_name) = match (user_id, zone_name) {
        (Some(user_id), Some(zone_name)) => (user_id, zone_name),
        _ => {
            return Err(ApiError::BadRequest(
                "userId and zoneName are required".to_string(),
            ));
        }
    };

    customers::repository::pin_object(user_id, &zone_name)
        .await
        .map_err(|e| {
            tracing::error!("Error pinning user to zone: {}", e);
            ApiError::Internal("Failed to pin user to zone".to_string())
        })?;

    Ok(format!("User {} pinned to zone {}", user_id, zone_name))
}
