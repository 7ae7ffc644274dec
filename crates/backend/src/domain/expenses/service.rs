use serde_json::{json, Value};

use contracts::domain::expenses::{
    map_expense_db_row_to_record, summarize_expenses, ExpenseDbInsert, ExpenseListResponse,
    ExpenseRecord, ExpenseStatus,
};

use super::repository;
use crate::shared::error::ApiError;

pub async fn list() -> Result<ExpenseListResponse, ApiError> {
    let rows = repository::list_all().await?;
    let items: Vec<ExpenseRecord> = rows
        .into_iter()
        .map(map_expense_db_row_to_record)
        .collect();
    let summary = summarize_expenses(&items);
    Ok(ExpenseListResponse { items, summary })
}

fn required_trimmed_string(value: Option<&Value>, field: &str) -> Result<String, ApiError> {
    let text = value.and_then(Value::as_str).map(str::trim).unwrap_or("");
    if text.is_empty() {
        return Err(ApiError::BadRequest(format!("{} is required.", field)));
    }
    Ok(text.to_string())
}

fn json_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < 9.0e15)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn parse_non_negative_int(value: Option<&Value>, field: &str) -> Result<i64, ApiError> {
    match value.and_then(json_int) {
        Some(amount) if amount >= 0 => Ok(amount),
        _ => Err(ApiError::BadRequest(format!(
            "{} must be an integer >= 0.",
            field
        ))),
    }
}

fn parse_status(value: &Value) -> Result<ExpenseStatus, ApiError> {
    value
        .as_str()
        .and_then(ExpenseStatus::parse)
        .ok_or_else(|| ApiError::BadRequest("Invalid status.".to_string()))
}

pub fn parse_create_body(body: &Value) -> Result<ExpenseDbInsert, ApiError> {
    if !body.is_object() {
        return Err(ApiError::BadRequest("Body must be a valid object.".to_string()));
    }

    let title = required_trimmed_string(body.get("title"), "title")?;
    let category = required_trimmed_string(body.get("category"), "category")?;
    let vendor = required_trimmed_string(body.get("vendor"), "vendor")?;
    let planned_amount = parse_non_negative_int(body.get("plannedAmount"), "plannedAmount")?;
    let object_id = parse_non_negative_int(body.get("objectId"), "objectId")?;

    let status = match body.get("status") {
        Some(value) => parse_status(value)?,
        None => ExpenseStatus::Draft,
    };

    let actual_amount = match body.get("actualAmount") {
        Some(value) => Some(parse_non_negative_int(Some(value), "actualAmount")?),
        None => None,
    };

    let due_date = body
        .get("dueDate")
        .and_then(Value::as_str)
        .filter(|d| !d.is_empty())
        .map(str::to_string);
    let notes = body
        .get("notes")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string);

    Ok(ExpenseDbInsert {
        title,
        category,
        vendor,
        planned_amount,
        actual_amount,
        currency: "UZS".to_string(),
        due_date,
        status,
        notes,
        object_id,
    })
}

pub async fn create(body: ExpenseDbInsert) -> Result<ExpenseRecord, ApiError> {
    let rows = repository::insert(&body).await?;
    let created = rows.into_iter().next().ok_or_else(|| {
        ApiError::Internal("Supabase did not return created expense.".to_string())
    })?;
    Ok(map_expense_db_row_to_record(created))
}

/// PATCH строится динамически; updated_at штампуется всегда, но тело
/// только из него считается пустым.
pub fn parse_update_body(body: &Value) -> Result<Value, ApiError> {
    if !body.is_object() {
        return Err(ApiError::BadRequest("Body must be a valid object.".to_string()));
    }

    let mut patch = serde_json::Map::new();
    patch.insert(
        "updated_at".to_string(),
        json!(chrono::Utc::now().to_rfc3339()),
    );

    if let Some(value) = body.get("status") {
        patch.insert("status".to_string(), json!(parse_status(value)?));
    }

    if let Some(value) = body.get("actualAmount") {
        patch.insert(
            "actual_amount".to_string(),
            json!(parse_non_negative_int(Some(value), "actualAmount")?),
        );
    }

    if let Some(value) = body.get("notes") {
        let notes = value.as_str().map(str::trim).filter(|n| !n.is_empty());
        patch.insert("notes".to_string(), json!(notes));
    }

    if patch.len() == 1 {
        return Err(ApiError::BadRequest("Nothing to update.".to_string()));
    }

    Ok(Value::Object(patch))
}

pub async fn update(id: i64, patch: &Value) -> Result<ExpenseRecord, ApiError> {
    let rows = repository::patch(id, patch).await?;
    let updated = rows
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::NotFound("Expense not found.".to_string()))?;
    Ok(map_expense_db_row_to_record(updated))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_body_requires_object_id() {
        let err = parse_create_body(&json!({
            "title": "Канцтовары",
            "category": "office",
            "vendor": "ООО Ромашка",
            "plannedAmount": 120000
        }))
        .unwrap_err();
        assert!(err.to_string().contains("objectId"));
    }

    #[test]
    fn create_body_defaults_status_to_draft() {
        let parsed = parse_create_body(&json!({
            "title": "Канцтовары",
            "category": "office",
            "vendor": "ООО Ромашка",
            "plannedAmount": 120000,
            "objectId": 1
        }))
        .unwrap();
        assert_eq!(parsed.status, ExpenseStatus::Draft);
        assert_eq!(parsed.currency, "UZS");
        assert!(parsed.actual_amount.is_none());
    }

    #[test]
    fn create_body_rejects_unknown_status() {
        let err = parse_create_body(&json!({
            "title": "t",
            "category": "c",
            "vendor": "v",
            "plannedAmount": 1,
            "objectId": 1,
            "status": "pending"
        }))
        .unwrap_err();
        assert_eq!(err.to_string(), "Invalid status.");
    }

    #[test]
    fn update_body_rejects_stamp_only_patch() {
        let err = parse_update_body(&json!({})).unwrap_err();
        assert_eq!(err.to_string(), "Nothing to update.");
    }

    #[test]
    fn update_body_blanks_notes_with_null() {
        let patch = parse_update_body(&json!({ "notes": "  " })).unwrap();
        assert_eq!(patch.get("notes"), Some(&Value::Null));
        assert!(patch.get("updated_at").is_some());
    }
}
