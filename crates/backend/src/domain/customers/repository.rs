use async_trait::async_trait;
use serde_json::json;

use contracts::domain::customers::{
    CustomerCredentialRow, CustomerDbInsert, CustomerDbRow, CustomerDbUpdate,
};

use super::import::CustomerImportRepository;
use crate::shared::data::postgrest::{self, eq};
use crate::shared::error::ApiError;

const TABLE: &str = "customers";

const SELECT_FULL: &str = "id,username,avatar,password,phone_number,passport_file,age,\
work_shift,object_pinned,object_positions,base_salary,position_bonus,salary_currency";

const SELECT_LEGACY: &str = "id,username,avatar,password,phone_number,passport_file,age,\
work_shift,object_pinned,object_positions";

const SELECT_CREDENTIALS: &str = "id,username,phone_number";

pub async fn list_all() -> Result<Vec<CustomerDbRow>, ApiError> {
    let client = postgrest::client()?;
    let full_query = [
        ("select", SELECT_FULL.to_string()),
        ("order", "id.asc".to_string()),
    ];

    match client.select::<CustomerDbRow>(TABLE, &full_query).await {
        Ok(rows) => Ok(rows),
        Err(_) => {
            // Fallback for old schema if salary columns are not added yet.
            let legacy_query = [
                ("select", SELECT_LEGACY.to_string()),
                ("order", "id.asc".to_string()),
            ];
            Ok(client.select(TABLE, &legacy_query).await?)
        }
    }
}

pub async fn insert_one(row: &CustomerDbInsert) -> Result<Vec<CustomerDbRow>, ApiError> {
    let client = postgrest::client()?;
    match client.insert_returning::<CustomerDbRow, _>(TABLE, row).await {
        Ok(rows) => Ok(rows),
        Err(e) if e.is_unique_violation() => Err(ApiError::Conflict(
            "Клиент с таким именем пользователя уже существует.".to_string(),
        )),
        Err(e) => match e.upstream_message() {
            Some(message) => Err(ApiError::BadRequest(message.to_string())),
            None => Err(ApiError::Internal(e.to_string())),
        },
    }
}

pub async fn update(
    id: i64,
    patch: &CustomerDbUpdate,
) -> Result<Vec<CustomerDbRow>, ApiError> {
    let client = postgrest::client()?;
    Ok(client
        .patch_returning(TABLE, &[("id", eq(id))], patch)
        .await?)
}

pub async fn delete(id: i64) -> Result<Vec<CustomerDbRow>, ApiError> {
    let client = postgrest::client()?;
    Ok(client.delete_returning(TABLE, &[("id", eq(id))]).await?)
}

/// Привязка сотрудника к объекту (используется страницей зон).
pub async fn pin_object(user_id: i64, object_pinned: &str) -> Result<(), ApiError> {
    let client = postgrest::client()?;
    client
        .patch(
            TABLE,
            &[("id", eq(user_id))],
            &json!({ "object_pinned": object_pinned }),
        )
        .await?;
    Ok(())
}

pub async fn list_by_ids(ids: &[i64]) -> Result<Vec<CustomerCredentialRow>, ApiError> {
    let client = postgrest::client()?;
    Ok(client
        .select(
            TABLE,
            &[
                ("select", SELECT_CREDENTIALS.to_string()),
                ("id", postgrest::in_list(ids)),
                ("order", "id.asc".to_string()),
            ],
        )
        .await?)
}

/// Боевая реализация хранилища импорта поверх PostgREST.
pub struct PostgrestImportRepository;

#[async_trait]
impl CustomerImportRepository for PostgrestImportRepository {
    async fn fetch_credentials(&self) -> anyhow::Result<Vec<CustomerCredentialRow>> {
        let client =
            postgrest::client().map_err(|e| anyhow::anyhow!(e.to_string()))?;
        Ok(client
            .select(TABLE, &[("select", SELECT_CREDENTIALS.to_string())])
            .await?)
    }

    async fn insert_batch(
        &self,
        rows: Vec<CustomerDbInsert>,
    ) -> anyhow::Result<Vec<CustomerDbRow>> {
        let client =
            postgrest::client().map_err(|e| anyhow::anyhow!(e.to_string()))?;
        Ok(client.insert_returning(TABLE, &rows).await?)
    }
}
