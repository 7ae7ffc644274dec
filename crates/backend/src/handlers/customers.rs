use axum::extract::{FromRequest, Multipart, Path, Query, Request};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use contracts::domain::customers::{CustomerRecord, ImportSummary};

use crate::domain::customers::import::{import_template_csv, BulkImporter};
use crate::domain::customers::repository::PostgrestImportRepository;
use crate::domain::customers::service;
use crate::shared::error::ApiError;
use crate::shared::spreadsheet::parse_spreadsheet;

fn parse_customer_id(raw: &str) -> Result<i64, ApiError> {
    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ApiError::BadRequest(
            "Некорректный идентификатор пользователя.".to_string(),
        )),
    }
}

/// GET /api/customers
pub async fn list_all() -> Result<Json<Vec<CustomerRecord>>, ApiError> {
    match service::list().await {
        Ok(records) => Ok(Json(records)),
        Err(e) => {
            tracing::error!("Failed to list customers: {}", e);
            Err(e)
        }
    }
}

/// POST /api/customers — JSON либо multipart/form-data с файлами.
pub async fn create(req: Request) -> Result<(StatusCode, Json<CustomerRecord>), ApiError> {
    let is_multipart = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.contains("multipart/form-data"))
        .unwrap_or(false);

    let body = if is_multipart {
        let mut multipart = Multipart::from_request(req, &()).await.map_err(|_| {
            ApiError::BadRequest("Данные multipart/form-data пусты.".to_string())
        })?;
        service::parse_multipart_body(&mut multipart).await?
    } else {
        let bytes = axum::body::to_bytes(req.into_body(), usize::MAX)
            .await
            .map_err(|_| {
                ApiError::BadRequest(
                    "Тело запроса должно быть корректным JSON-объектом.".to_string(),
                )
            })?;
        let value: Value = serde_json::from_slice(&bytes).map_err(|_| {
            ApiError::BadRequest("Тело запроса должно быть корректным JSON-объектом.".to_string())
        })?;
        service::parse_json_body(&value)?
    };

    match service::create(body).await {
        Ok(record) => Ok((StatusCode::CREATED, Json(record))),
        Err(e) => {
            tracing::error!("Failed to create customer: {}", e);
            Err(e)
        }
    }
}

/// PATCH /api/customers/:id
pub async fn update(
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<CustomerRecord>, ApiError> {
    let customer_id = parse_customer_id(&id)?;
    let update_body = service::parse_update_body(&body)?;
    match service::update(customer_id, update_body).await {
        Ok(record) => Ok(Json(record)),
        Err(e) => {
            tracing::error!("Failed to update customer {}: {}", customer_id, e);
            Err(e)
        }
    }
}

/// DELETE /api/customers/:id
pub async fn delete(Path(id): Path<String>) -> Result<Json<CustomerRecord>, ApiError> {
    let customer_id = parse_customer_id(&id)?;
    match service::delete(customer_id).await {
        Ok(record) => Ok(Json(record)),
        Err(e) => {
            tracing::error!("Failed to delete customer {}: {}", customer_id, e);
            Err(e)
        }
    }
}

/// POST /api/customers/bulk-import — файл .csv/.xlsx в поле "file".
pub async fn bulk_import(mut multipart: Multipart) -> Result<Json<ImportSummary>, ApiError> {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut has_parts = false;

    while let Some(field) = multipart.next_field().await.map_err(|_| {
        ApiError::BadRequest("multipart/form-data is empty.".to_string())
    })? {
        has_parts = true;
        let is_file_field = field.name() == Some("file");
        let filename = field.file_name().map(str::to_string);

        if is_file_field {
            if let Some(filename) = filename {
                let data = field
                    .bytes()
                    .await
                    .map_err(|_| {
                        ApiError::BadRequest("multipart/form-data is empty.".to_string())
                    })?
                    .to_vec();
                file = Some((filename, data));
            }
        }
    }

    if !has_parts {
        return Err(ApiError::BadRequest("multipart/form-data is empty.".to_string()));
    }

    let (filename, data) = file.ok_or_else(|| {
        ApiError::BadRequest("File is required in field \"file\".".to_string())
    })?;

    let rows = parse_spreadsheet(&data, &filename)
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    if rows.is_empty() {
        return Err(ApiError::BadRequest("Spreadsheet is empty.".to_string()));
    }

    let importer = BulkImporter::new(Arc::new(PostgrestImportRepository));
    match importer.import(&rows).await {
        Ok(summary) => Ok(Json(summary)),
        Err(e) => {
            tracing::error!("Bulk import failed: {}", e);
            Err(e)
        }
    }
}

/// GET /api/customers/import-template?format=csv
pub async fn import_template(
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response, ApiError> {
    match params.get("format").map(String::as_str) {
        None | Some("csv") => {}
        Some(other) => {
            return Err(ApiError::BadRequest(format!(
                "Template format \"{}\" is not supported, use csv.",
                other
            )));
        }
    }

    let csv = import_template_csv();
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"customers-import-template.csv\"",
            ),
        ],
        csv,
    )
        .into_response())
}
