use contracts::domain::objects::{ObjectDbInsert, ObjectDbRow, ObjectListRow, ZoneDbInsert};
use serde_json::Value;

use crate::shared::data::postgrest::{self, eq};
use crate::shared::error::ApiError;

const TABLE: &str = "objects";

pub async fn list_short() -> Result<Vec<ObjectListRow>, ApiError> {
    let client = postgrest::client()?;
    Ok(client
        .select(
            TABLE,
            &[
                ("select", "id,name,description".to_string()),
                ("order", "id.asc".to_string()),
            ],
        )
        .await?)
}

pub async fn list_full() -> Result<Vec<ObjectDbRow>, ApiError> {
    let client = postgrest::client()?;
    Ok(client
        .select(
            TABLE,
            &[
                ("select", "id,name,description,created_at".to_string()),
                ("order", "id.asc".to_string()),
            ],
        )
        .await?)
}

pub async fn insert(row: &ObjectDbInsert) -> Result<Vec<Value>, ApiError> {
    let client = postgrest::client()?;
    Ok(client.insert_returning(TABLE, row).await?)
}

pub async fn insert_zone(row: &ZoneDbInsert) -> Result<Vec<Value>, ApiError> {
    let client = postgrest::client()?;
    Ok(client.insert_returning(TABLE, row).await?)
}

pub async fn delete(id: i64) -> Result<(), ApiError> {
    let client = postgrest::client()?;
    client.delete(TABLE, &[("id", eq(id))]).await?;
    Ok(())
}
