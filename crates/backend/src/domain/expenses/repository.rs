use serde_json::Value;

use contracts::domain::expenses::{ExpenseDbInsert, ExpenseDbRow};

use crate::shared::data::postgrest::{self, eq};
use crate::shared::error::ApiError;

const TABLE: &str = "expenses";

const SELECT: &str = "id,title,category,vendor,planned_amount,actual_amount,currency,\
due_date,status,notes,created_at,updated_at";

pub async fn list_all() -> Result<Vec<ExpenseDbRow>, ApiError> {
    let client = postgrest::client()?;
    Ok(client
        .select(
            TABLE,
            &[
                ("select", SELECT.to_string()),
                ("order", "id.desc".to_string()),
            ],
        )
        .await?)
}

pub async fn insert(row: &ExpenseDbInsert) -> Result<Vec<ExpenseDbRow>, ApiError> {
    let client = postgrest::client()?;
    Ok(client.insert_returning(TABLE, row).await?)
}

pub async fn patch(id: i64, body: &Value) -> Result<Vec<ExpenseDbRow>, ApiError> {
    let client = postgrest::client()?;
    Ok(client.patch_returning(TABLE, &[("id", eq(id))], body).await?)
}
