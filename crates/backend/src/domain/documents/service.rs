use serde_json::{json, Value};
use std::collections::HashMap;

use contracts::domain::documents::{
    map_dispatch_db_row_to_record, map_signed_db_row_to_record, map_template_db_row_to_record,
    resolve_status, CreateTemplateBody, DocumentDispatchRecord, DocumentTemplateDbRow,
    DocumentsOverview, SendDocumentBody, SignedDocumentRecord, TemplateProject,
    UpdateTemplateBody,
};

use super::repository;
use crate::domain::customers;
use crate::shared::config;
use crate::shared::data::storage;
use crate::shared::error::ApiError;
use crate::shared::spreadsheet::write_csv;

// ============================================================================
// Сводная страница
// ============================================================================

pub async fn overview() -> Result<DocumentsOverview, ApiError> {
    let (templates, dispatches, signed) = tokio::join!(
        repository::list_templates_or_empty(),
        repository::list_dispatches_or_empty(),
        repository::list_signed_or_empty(),
    );
    let templates = templates?;
    let dispatches = dispatches?;
    let signed = signed?;

    let templates: Vec<_> = templates
        .into_iter()
        .map(map_template_db_row_to_record)
        .collect();
    let name_by_id: HashMap<i64, String> = templates
        .iter()
        .map(|template| (template.id, template.name.clone()))
        .collect();

    let sent = dispatches
        .into_iter()
        .map(map_dispatch_db_row_to_record)
        .map(|mut dispatch| {
            dispatch.template_name = dispatch
                .template_id
                .and_then(|id| name_by_id.get(&id).cloned());
            dispatch
        })
        .collect();

    let signed = signed
        .into_iter()
        .map(map_signed_db_row_to_record)
        .map(|mut item| {
            item.template_name = item.template_id.and_then(|id| name_by_id.get(&id).cloned());
            item
        })
        .collect();

    Ok(DocumentsOverview {
        templates,
        sent,
        signed,
    })
}

pub async fn list_templates() -> Result<Vec<Value>, ApiError> {
    let rows = repository::list_templates().await?;
    Ok(rows
        .into_iter()
        .map(|row| serde_json::to_value(map_template_db_row_to_record(row)).unwrap_or(Value::Null))
        .collect())
}

// ============================================================================
// Шаблоны: хранение проекта в object storage + строка в таблице
// ============================================================================

fn sanitize_path_segment(value: &str) -> String {
    let lowered = value.to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    let mut in_run = false;
    for ch in lowered.chars() {
        let allowed =
            ch.is_ascii_lowercase() || ch.is_ascii_digit() || matches!(ch, '.' | '_' | '-');
        if allowed {
            out.push(ch);
            in_run = false;
        } else if !in_run {
            out.push('-');
            in_run = true;
        }
    }
    let trimmed = out.trim_matches('-').to_string();
    if trimmed.is_empty() {
        "template".to_string()
    } else {
        trimmed
    }
}

fn template_bucket() -> &'static str {
    config::get().supabase.document_template_bucket.as_str()
}

async fn ensure_template_bucket() -> Result<(), ApiError> {
    let bucket = template_bucket();
    storage::client()?
        .ensure_bucket(bucket, false)
        .await
        .map_err(|e| {
            tracing::error!("Failed to ensure template bucket {}: {}", bucket, e);
            ApiError::Internal(format!(
                "Unable to initialize storage bucket \"{}\".",
                bucket
            ))
        })
}

async fn upload_project(
    storage_path: &str,
    project: &TemplateProject,
    upload_error: &str,
) -> Result<(), ApiError> {
    let serialized = serde_json::to_vec(project)
        .map_err(|e| ApiError::Internal(format!("Failed to serialize template project: {}", e)))?;
    storage::client()?
        .upload_object(
            template_bucket(),
            storage_path,
            serialized,
            "application/json; charset=utf-8",
        )
        .await
        .map_err(|e| {
            tracing::error!("Failed to upload template project {}: {}", storage_path, e);
            ApiError::BadRequest(upload_error.to_string())
        })
}

fn record_with_project(row: DocumentTemplateDbRow, project_data: Value) -> Value {
    let mut value = serde_json::to_value(map_template_db_row_to_record(row)).unwrap_or(Value::Null);
    if let Value::Object(map) = &mut value {
        map.insert("projectData".to_string(), project_data);
    }
    value
}

pub async fn create_template(body: CreateTemplateBody) -> Result<Value, ApiError> {
    let name = body
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Template name is required.".to_string()))?
        .to_string();

    let description = body
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string);
    let contract_type = body
        .contract_type
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or("gph")
        .to_string();
    let html = body.html.unwrap_or_default();
    let css = body.css.unwrap_or_default();

    ensure_template_bucket().await?;

    let storage_path = format!(
        "{}/{}-{}.json",
        sanitize_path_segment(&name),
        chrono::Utc::now().timestamp_millis(),
        uuid::Uuid::new_v4()
    );

    let project = TemplateProject {
        name: name.clone(),
        description: description.clone(),
        contract_type: contract_type.clone(),
        html: html.clone(),
        css: css.clone(),
        project_data: body.project_data.clone(),
        updated_at: Some(chrono::Utc::now().to_rfc3339()),
        recovered_at: None,
    };
    upload_project(
        &storage_path,
        &project,
        "Failed to upload template project to Supabase storage.",
    )
    .await?;

    let rows = repository::insert_template(&json!({
        "name": name,
        "description": description,
        "contract_type": contract_type,
        "html": html,
        "css": css,
        "storage_path": storage_path,
    }))
    .await?;

    let created = rows.into_iter().next().ok_or_else(|| {
        ApiError::Internal("Supabase did not return created template row.".to_string())
    })?;

    Ok(record_with_project(
        created,
        body.project_data.unwrap_or(Value::Null),
    ))
}

/// Шаблон вместе с проектом из storage. Потерянный объект восстанавливается
/// из html/css строки и загружается обратно.
pub async fn get_template(id: i64) -> Result<Value, ApiError> {
    let row = repository::get_template(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Template not found.".to_string()))?;

    let project_raw = match storage::client()?
        .download_object(template_bucket(), &row.storage_path)
        .await
    {
        Ok(raw) => raw,
        Err(e) if e.is_not_found() => {
            ensure_template_bucket().await?;

            let fallback = TemplateProject {
                name: row.name.clone(),
                description: row.description.clone(),
                contract_type: row.contract_type.clone(),
                html: row.html.clone(),
                css: row.css.clone(),
                project_data: None,
                updated_at: None,
                recovered_at: Some(chrono::Utc::now().to_rfc3339()),
            };
            upload_project(
                &row.storage_path,
                &fallback,
                "Failed to recreate missing template project in storage.",
            )
            .await?;

            serde_json::to_string(&fallback).unwrap_or_default()
        }
        Err(e) => {
            tracing::error!("Failed to download template project: {}", e);
            return Err(e.into());
        }
    };

    let project_data = serde_json::from_str::<Value>(&project_raw).unwrap_or(Value::Null);
    Ok(record_with_project(row, project_data))
}

pub async fn update_template(id: i64, body: UpdateTemplateBody) -> Result<Value, ApiError> {
    let existing = repository::get_template(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Template not found.".to_string()))?;

    let next_name = body
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(&existing.name)
        .to_string();
    let next_description = match body.description.as_deref() {
        Some(description) => {
            let trimmed = description.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        None => existing.description.clone().filter(|d| !d.is_empty()),
    };
    let next_contract_type = body
        .contract_type
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(&existing.contract_type)
        .to_string();
    let next_html = body.html.unwrap_or_else(|| existing.html.clone());
    let next_css = body.css.unwrap_or_else(|| existing.css.clone());

    let project = TemplateProject {
        name: next_name.clone(),
        description: next_description.clone(),
        contract_type: next_contract_type.clone(),
        html: next_html.clone(),
        css: next_css.clone(),
        project_data: body.project_data.clone(),
        updated_at: Some(chrono::Utc::now().to_rfc3339()),
        recovered_at: None,
    };
    upload_project(
        &existing.storage_path,
        &project,
        "Failed to update template project in storage.",
    )
    .await?;

    let rows = repository::patch_template(
        id,
        &json!({
            "name": next_name,
            "description": next_description,
            "contract_type": next_contract_type,
            "html": next_html,
            "css": next_css,
            "updated_at": chrono::Utc::now().to_rfc3339(),
        }),
    )
    .await?;

    let updated = rows.into_iter().next().ok_or_else(|| {
        ApiError::Internal("Supabase did not return updated template.".to_string())
    })?;

    Ok(record_with_project(
        updated,
        body.project_data.unwrap_or(Value::Null),
    ))
}

pub async fn delete_template(id: i64) -> Result<Value, ApiError> {
    let rows = repository::delete_template(id).await?;
    if rows.is_empty() {
        return Err(ApiError::NotFound("Template not found.".to_string()));
    }
    Ok(json!({ "success": true, "id": id }))
}

// ============================================================================
// Рассылка на подпись
// ============================================================================

fn json_positive_int(value: &Value) -> Option<i64> {
    let parsed = match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < 9.0e15)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    parsed.filter(|v| *v > 0)
}

#[derive(Debug)]
struct SendRequest {
    template_id: i64,
    recipient_ids: Vec<i64>,
    title: Option<String>,
}

fn parse_send_body(body: SendDocumentBody) -> Result<SendRequest, ApiError> {
    let template_id = body
        .template_id
        .as_ref()
        .and_then(json_positive_int)
        .ok_or_else(|| {
            ApiError::BadRequest("templateId must be a positive integer.".to_string())
        })?;

    let raw_ids = body.recipient_ids.unwrap_or_default();
    if raw_ids.is_empty() {
        return Err(ApiError::BadRequest(
            "recipientIds must contain at least one user id.".to_string(),
        ));
    }

    // Невалидные значения отбрасываются, повторы схлопываются
    // с сохранением порядка.
    let mut recipient_ids: Vec<i64> = Vec::new();
    for raw in &raw_ids {
        if let Some(id) = json_positive_int(raw) {
            if !recipient_ids.contains(&id) {
                recipient_ids.push(id);
            }
        }
    }
    if recipient_ids.is_empty() {
        return Err(ApiError::BadRequest(
            "recipientIds must contain valid positive integers.".to_string(),
        ));
    }

    Ok(SendRequest {
        template_id,
        recipient_ids,
        title: body
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string),
    })
}

/// Создание рассылки: получатели читаются из customers, подпись половины
/// из них имитируется, статус выводится из счётчиков.
pub async fn send(body: SendDocumentBody) -> Result<Value, ApiError> {
    let request = parse_send_body(body)?;

    let template = repository::get_template(request.template_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Template not found.".to_string()))?;

    let recipients = customers::repository::list_by_ids(&request.recipient_ids).await?;
    if recipients.is_empty() {
        return Err(ApiError::NotFound("Recipients were not found.".to_string()));
    }

    let recipient_ids: Vec<i64> = recipients.iter().map(|c| c.id).collect();
    let recipient_phones: Vec<String> =
        recipients.iter().map(|c| c.phone_number.clone()).collect();
    let now = chrono::Utc::now();
    let dispatch_title = request.title.unwrap_or_else(|| {
        format!("{} - {}", template.name, now.format("%d.%m.%Y"))
    });

    let inserted = repository::insert_dispatch(&json!({
        "template_id": template.id,
        "title": dispatch_title,
        "recipient_ids": recipient_ids,
        "recipient_phones": recipient_phones,
        "recipient_count": recipient_ids.len(),
        "signed_count": 0,
        "status": "sent",
        "sent_at": now.to_rfc3339(),
    }))
    .await?;

    let dispatch = inserted.into_iter().next().ok_or_else(|| {
        ApiError::Internal("Supabase did not return dispatch row.".to_string())
    })?;

    let simulated_signed: Vec<_> = recipients
        .iter()
        .enumerate()
        .filter(|(index, _)| index % 2 == 0)
        .map(|(_, customer)| customer)
        .collect();

    if !simulated_signed.is_empty() {
        let signed_rows: Vec<Value> = simulated_signed
            .iter()
            .map(|customer| {
                json!({
                    "dispatch_id": dispatch.id,
                    "template_id": template.id,
                    "employee_name": customer.username,
                    "phone_number": customer.phone_number,
                    "signed_at": now.to_rfc3339(),
                    "signed_via": "mobile",
                    "file_url": Value::Null,
                })
            })
            .collect();
        repository::insert_signed_batch(&Value::Array(signed_rows)).await?;
    }

    let signed_count = simulated_signed.len();
    let status = resolve_status(recipient_ids.len(), signed_count);

    let updated = repository::patch_dispatch(
        dispatch.id,
        &json!({
            "signed_count": signed_count,
            "status": status,
        }),
    )
    .await?;

    let final_dispatch = updated.into_iter().next().unwrap_or(dispatch);
    let mut record = map_dispatch_db_row_to_record(final_dispatch);
    record.template_name = Some(template.name);
    Ok(serde_json::to_value(record).unwrap_or(Value::Null))
}

// ============================================================================
// Экспорт
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportScope {
    Templates,
    Sent,
    Signed,
}

impl ExportScope {
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("templates") => ExportScope::Templates,
            Some("sent") => ExportScope::Sent,
            Some("signed") => ExportScope::Signed,
            _ => ExportScope::Signed,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExportScope::Templates => "templates",
            ExportScope::Sent => "sent",
            ExportScope::Signed => "signed",
        }
    }
}

fn dispatch_rows_for_export(
    dispatches: Vec<DocumentDispatchRecord>,
    name_by_id: &HashMap<i64, String>,
) -> Vec<Vec<String>> {
    dispatches
        .into_iter()
        .map(|dispatch| {
            let template_name = dispatch
                .template_id
                .map(|id| {
                    name_by_id
                        .get(&id)
                        .cloned()
                        .unwrap_or_else(|| format!("#{}", id))
                })
                .unwrap_or_else(|| "n/a".to_string());
            vec![
                dispatch.id.to_string(),
                template_name,
                dispatch.title,
                dispatch.recipient_count.to_string(),
                dispatch.signed_count.to_string(),
                serde_json::to_value(dispatch.status)
                    .ok()
                    .and_then(|v| v.as_str().map(str::to_string))
                    .unwrap_or_default(),
                dispatch.sent_at,
            ]
        })
        .collect()
}

fn signed_rows_for_export(
    signed: Vec<SignedDocumentRecord>,
    name_by_id: &HashMap<i64, String>,
) -> Vec<Vec<String>> {
    signed
        .into_iter()
        .map(|item| {
            let template_name = item
                .template_id
                .map(|id| {
                    name_by_id
                        .get(&id)
                        .cloned()
                        .unwrap_or_else(|| format!("#{}", id))
                })
                .unwrap_or_else(|| "n/a".to_string());
            vec![
                item.id.to_string(),
                template_name,
                item.employee_name,
                item.phone_number,
                item.signed_via,
                item.signed_at,
            ]
        })
        .collect()
}

/// CSV-выгрузка выбранной коллекции. Возвращает имя файла без расширения
/// и содержимое.
pub async fn export(scope: ExportScope) -> Result<(String, String), ApiError> {
    let templates: Vec<_> = repository::list_templates()
        .await?
        .into_iter()
        .map(map_template_db_row_to_record)
        .collect();
    let name_by_id: HashMap<i64, String> = templates
        .iter()
        .map(|template| (template.id, template.name.clone()))
        .collect();

    let csv = match scope {
        ExportScope::Templates => {
            let rows: Vec<Vec<String>> = templates
                .into_iter()
                .map(|template| {
                    vec![
                        template.id.to_string(),
                        template.name,
                        template.contract_type,
                        template.created_at,
                        template.updated_at,
                    ]
                })
                .collect();
            write_csv(
                &["id", "name", "contractType", "createdAt", "updatedAt"],
                &rows,
            )
        }
        ExportScope::Sent => {
            let dispatches: Vec<_> = repository::list_dispatches()
                .await?
                .into_iter()
                .map(map_dispatch_db_row_to_record)
                .collect();
            write_csv(
                &[
                    "id",
                    "templateName",
                    "title",
                    "recipients",
                    "signedCount",
                    "status",
                    "sentAt",
                ],
                &dispatch_rows_for_export(dispatches, &name_by_id),
            )
        }
        ExportScope::Signed => {
            let signed: Vec<_> = repository::list_signed()
                .await?
                .into_iter()
                .map(map_signed_db_row_to_record)
                .collect();
            write_csv(
                &[
                    "id",
                    "templateName",
                    "employeeName",
                    "phoneNumber",
                    "signedVia",
                    "signedAt",
                ],
                &signed_rows_for_export(signed, &name_by_id),
            )
        }
    };

    let date_stamp = chrono::Utc::now().format("%Y-%m-%d");
    Ok((format!("documents-{}-{}", scope.as_str(), date_stamp), csv))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_scope_parsing_defaults_to_signed() {
        assert_eq!(ExportScope::parse(Some("templates")), ExportScope::Templates);
        assert_eq!(ExportScope::parse(Some("sent")), ExportScope::Sent);
        assert_eq!(ExportScope::parse(Some("nonsense")), ExportScope::Signed);
        assert_eq!(ExportScope::parse(None), ExportScope::Signed);
    }

    #[test]
    fn send_body_requires_positive_template_id() {
        let err = parse_send_body(SendDocumentBody {
            template_id: Some(json!(0)),
            recipient_ids: Some(vec![json!(1)]),
            title: None,
        })
        .unwrap_err();
        assert!(err.to_string().contains("templateId"));
    }

    #[test]
    fn send_body_dedupes_recipients_preserving_order() {
        let parsed = parse_send_body(SendDocumentBody {
            template_id: Some(json!("5")),
            recipient_ids: Some(vec![json!(3), json!(1), json!(3), json!("2"), json!(-4)]),
            title: Some("  Договор  ".to_string()),
        })
        .unwrap();
        assert_eq!(parsed.template_id, 5);
        assert_eq!(parsed.recipient_ids, vec![3, 1, 2]);
        assert_eq!(parsed.title.as_deref(), Some("Договор"));
    }

    #[test]
    fn send_body_rejects_all_invalid_recipients() {
        let err = parse_send_body(SendDocumentBody {
            template_id: Some(json!(1)),
            recipient_ids: Some(vec![json!(0), json!("x")]),
            title: None,
        })
        .unwrap_err();
        assert!(err.to_string().contains("valid positive integers"));
    }

    #[test]
    fn template_path_segment_fallback() {
        assert_eq!(sanitize_path_segment("Договор ГПХ"), "template");
        assert_eq!(sanitize_path_segment("GPH contract 2025"), "gph-contract-2025");
    }
}
