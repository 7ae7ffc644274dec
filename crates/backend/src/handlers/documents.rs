use axum::extract::{Path, Query};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::Value;
use std::collections::HashMap;

use contracts::domain::documents::{
    CreateTemplateBody, DocumentsOverview, SendDocumentBody, UpdateTemplateBody,
};

use crate::domain::documents::service::{self, ExportScope};
use crate::shared::error::ApiError;

fn parse_template_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| ApiError::BadRequest("Invalid template id.".to_string()))
}

/// GET /api/documents
pub async fn overview() -> Result<Json<DocumentsOverview>, ApiError> {
    match service::overview().await {
        Ok(payload) => Ok(Json(payload)),
        Err(e) => {
            tracing::error!("Failed to load documents overview: {}", e);
            Err(e)
        }
    }
}

/// GET /api/documents/templates
pub async fn list_templates() -> Result<Json<Vec<Value>>, ApiError> {
    match service::list_templates().await {
        Ok(templates) => Ok(Json(templates)),
        Err(e) => {
            tracing::error!("Failed to list templates: {}", e);
            Err(e)
        }
    }
}

/// POST /api/documents/templates
pub async fn create_template(
    Json(body): Json<CreateTemplateBody>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    match service::create_template(body).await {
        Ok(created) => Ok((StatusCode::CREATED, Json(created))),
        Err(e) => {
            tracing::error!("Failed to create template: {}", e);
            Err(e)
        }
    }
}

/// GET /api/documents/templates/:id
pub async fn get_template(Path(id): Path<String>) -> Result<Json<Value>, ApiError> {
    let template_id = parse_template_id(&id)?;
    match service::get_template(template_id).await {
        Ok(template) => Ok(Json(template)),
        Err(e) => {
            tracing::error!("Failed to load template {}: {}", template_id, e);
            Err(e)
        }
    }
}

/// PUT /api/documents/templates/:id
pub async fn update_template(
    Path(id): Path<String>,
    Json(body): Json<UpdateTemplateBody>,
) -> Result<Json<Value>, ApiError> {
    let template_id = parse_template_id(&id)?;
    match service::update_template(template_id, body).await {
        Ok(updated) => Ok(Json(updated)),
        Err(e) => {
            tracing::error!("Failed to update template {}: {}", template_id, e);
            Err(e)
        }
    }
}

/// DELETE /api/documents/:id
pub async fn delete_template(Path(id): Path<String>) -> Result<Json<Value>, ApiError> {
    let template_id = parse_template_id(&id)?;
    match service::delete_template(template_id).await {
        Ok(result) => Ok(Json(result)),
        Err(e) => {
            tracing::error!("Failed to delete template {}: {}", template_id, e);
            Err(e)
        }
    }
}

/// POST /api/documents/send
pub async fn send(Json(body): Json<SendDocumentBody>) -> Result<Json<Value>, ApiError> {
    match service::send(body).await {
        Ok(dispatch) => Ok(Json(dispatch)),
        Err(e) => {
            tracing::error!("Failed to send documents: {}", e);
            Err(e)
        }
    }
}

/// GET /api/documents/export?scope=&format=csv
pub async fn export(
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response, ApiError> {
    match params.get("format").map(String::as_str) {
        None | Some("csv") => {}
        Some(other) => {
            return Err(ApiError::BadRequest(format!(
                "Export format \"{}\" is not supported, use csv.",
                other
            )));
        }
    }

    let scope = ExportScope::parse(params.get("scope").map(String::as_str));
    let (file_stem, csv) = service::export(scope).await?;

    let disposition = format!("attachment; filename=\"{}.csv\"", file_stem);
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    )
        .into_response())
}
