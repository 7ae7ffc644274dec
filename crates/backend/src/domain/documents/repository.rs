use serde_json::Value;

use contracts::domain::documents::{
    DocumentDispatchDbRow, DocumentTemplateDbRow, SignedDocumentDbRow,
};

use crate::shared::data::postgrest::{self, eq, PostgrestError};
use crate::shared::error::ApiError;

const TEMPLATES: &str = "document_templates";
const DISPATCHES: &str = "document_dispatches";
const SIGNED: &str = "signed_documents";

const TEMPLATE_SELECT: &str =
    "id,name,description,contract_type,html,css,storage_path,created_at,updated_at";
const DISPATCH_SELECT: &str =
    "id,template_id,title,recipient_ids,recipient_phones,recipient_count,signed_count,status,sent_at";
const SIGNED_SELECT: &str =
    "id,dispatch_id,template_id,employee_name,phone_number,signed_at,signed_via,file_url";

/// Таблицы документов могут быть ещё не накачены миграцией — ошибка 42P01
/// получает подсказку, куда смотреть.
fn map_documents_error(e: PostgrestError) -> ApiError {
    if e.is_missing_table() {
        return ApiError::Internal(
            "Table \"document_templates\" is missing. Run db/supabase/documents.sql first."
                .to_string(),
        );
    }
    match e.upstream_message() {
        Some(message) => ApiError::BadRequest(message.to_string()),
        None => ApiError::Internal(e.to_string()),
    }
}

pub async fn list_templates() -> Result<Vec<DocumentTemplateDbRow>, ApiError> {
    let client = postgrest::client()?;
    client
        .select(
            TEMPLATES,
            &[
                ("select", TEMPLATE_SELECT.to_string()),
                ("order", "id.desc".to_string()),
            ],
        )
        .await
        .map_err(map_documents_error)
}

/// Сводная страница терпима к отсутствующим таблицам: вместо ошибки
/// отдаётся пустой список.
pub async fn list_templates_or_empty() -> Result<Vec<DocumentTemplateDbRow>, ApiError> {
    let client = postgrest::client()?;
    match client
        .select(
            TEMPLATES,
            &[
                ("select", TEMPLATE_SELECT.to_string()),
                ("order", "id.desc".to_string()),
            ],
        )
        .await
    {
        Ok(rows) => Ok(rows),
        Err(e) if e.is_missing_table() => Ok(Vec::new()),
        Err(e) => Err(e.into()),
    }
}

pub async fn get_template(id: i64) -> Result<Option<DocumentTemplateDbRow>, ApiError> {
    let client = postgrest::client()?;
    let rows: Vec<DocumentTemplateDbRow> = client
        .select(
            TEMPLATES,
            &[
                ("select", TEMPLATE_SELECT.to_string()),
                ("id", eq(id)),
                ("limit", "1".to_string()),
            ],
        )
        .await
        .map_err(map_documents_error)?;
    Ok(rows.into_iter().next())
}

pub async fn insert_template(body: &Value) -> Result<Vec<DocumentTemplateDbRow>, ApiError> {
    let client = postgrest::client()?;
    client
        .insert_returning(TEMPLATES, body)
        .await
        .map_err(map_documents_error)
}

pub async fn patch_template(
    id: i64,
    body: &Value,
) -> Result<Vec<DocumentTemplateDbRow>, ApiError> {
    let client = postgrest::client()?;
    client
        .patch_returning(TEMPLATES, &[("id", eq(id))], body)
        .await
        .map_err(map_documents_error)
}

pub async fn delete_template(id: i64) -> Result<Vec<Value>, ApiError> {
    let client = postgrest::client()?;
    client
        .delete_returning(TEMPLATES, &[("id", eq(id))])
        .await
        .map_err(map_documents_error)
}

pub async fn list_dispatches() -> Result<Vec<DocumentDispatchDbRow>, ApiError> {
    let client = postgrest::client()?;
    client
        .select(
            DISPATCHES,
            &[
                ("select", DISPATCH_SELECT.to_string()),
                ("order", "id.desc".to_string()),
            ],
        )
        .await
        .map_err(map_documents_error)
}

pub async fn list_dispatches_or_empty() -> Result<Vec<DocumentDispatchDbRow>, ApiError> {
    let client = postgrest::client()?;
    match client
        .select::<DocumentDispatchDbRow>(
            DISPATCHES,
            &[
                ("select", DISPATCH_SELECT.to_string()),
                ("order", "id.desc".to_string()),
            ],
        )
        .await
    {
        Ok(rows) => Ok(rows),
        Err(e) if e.is_missing_table() => Ok(Vec::new()),
        Err(e) => Err(e.into()),
    }
}

pub async fn insert_dispatch(body: &Value) -> Result<Vec<DocumentDispatchDbRow>, ApiError> {
    let client = postgrest::client()?;
    client
        .insert_returning(DISPATCHES, body)
        .await
        .map_err(map_documents_error)
}

pub async fn patch_dispatch(
    id: i64,
    body: &Value,
) -> Result<Vec<DocumentDispatchDbRow>, ApiError> {
    let client = postgrest::client()?;
    client
        .patch_returning(DISPATCHES, &[("id", eq(id))], body)
        .await
        .map_err(map_documents_error)
}

pub async fn list_signed() -> Result<Vec<SignedDocumentDbRow>, ApiError> {
    let client = postgrest::client()?;
    client
        .select(
            SIGNED,
            &[
                ("select", SIGNED_SELECT.to_string()),
                ("order", "signed_at.desc".to_string()),
            ],
        )
        .await
        .map_err(map_documents_error)
}

pub async fn list_signed_or_empty() -> Result<Vec<SignedDocumentDbRow>, ApiError> {
    let client = postgrest::client()?;
    match client
        .select::<SignedDocumentDbRow>(
            SIGNED,
            &[
                ("select", SIGNED_SELECT.to_string()),
                ("order", "signed_at.desc".to_string()),
            ],
        )
        .await
    {
        Ok(rows) => Ok(rows),
        Err(e) if e.is_missing_table() => Ok(Vec::new()),
        Err(e) => Err(e.into()),
    }
}

pub async fn insert_signed_batch(rows: &Value) -> Result<(), ApiError> {
    let client = postgrest::client()?;
    client.insert(SIGNED, rows).await?;
    Ok(())
}
