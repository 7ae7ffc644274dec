use axum::extract::Multipart;
use serde_json::Value;
use std::collections::HashMap;

use contracts::domain::customers::{
    map_create_body_to_db_insert, map_customer_db_row_to_record, map_update_body_to_db_update,
    Avatar, CreateCustomerBody, CustomerRecord, UpdateCustomerBody, WorkShift,
};

use super::import::{parse_object_positions, PositionsValue};
use super::repository;
use crate::shared::config;
use crate::shared::data::storage;
use crate::shared::error::ApiError;

pub async fn list() -> Result<Vec<CustomerRecord>, ApiError> {
    let rows = repository::list_all().await?;
    Ok(rows.into_iter().map(map_customer_db_row_to_record).collect())
}

pub async fn create(body: CreateCustomerBody) -> Result<CustomerRecord, ApiError> {
    let rows = repository::insert_one(&map_create_body_to_db_insert(body)).await?;
    let created = rows.into_iter().next().ok_or_else(|| {
        ApiError::Internal("Supabase не вернул созданного клиента.".to_string())
    })?;
    Ok(map_customer_db_row_to_record(created))
}

pub async fn update(id: i64, body: UpdateCustomerBody) -> Result<CustomerRecord, ApiError> {
    let rows = repository::update(id, &map_update_body_to_db_update(&body)).await?;
    let updated = rows
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::NotFound("Пользователь не найден.".to_string()))?;
    Ok(map_customer_db_row_to_record(updated))
}

pub async fn delete(id: i64) -> Result<CustomerRecord, ApiError> {
    let rows = repository::delete(id).await?;
    let deleted = rows
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::NotFound("Пользователь не найден.".to_string()))?;
    Ok(map_customer_db_row_to_record(deleted))
}

// ============================================================================
// Разбор JSON-тела создания
// ============================================================================

fn json_int(value: &Value) -> Option<i64> {
    match value {
        // 28.0 из JSON тоже считается целым.
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < 9.0e15)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn required_string(value: Option<&Value>, field: &str) -> Result<String, ApiError> {
    let text = value.and_then(Value::as_str).map(str::trim).unwrap_or("");
    if text.is_empty() {
        return Err(ApiError::BadRequest(format!("Поле {} обязательно.", field)));
    }
    Ok(text.to_string())
}

fn parse_age_value(value: Option<&Value>) -> Result<i64, ApiError> {
    let age = value.and_then(json_int).unwrap_or(-1);
    if age < 18 {
        return Err(ApiError::BadRequest(
            "Возраст должен быть целым числом не меньше 18.".to_string(),
        ));
    }
    Ok(age)
}

fn parse_optional_money(value: Option<&Value>, field: &str) -> Result<Option<i64>, ApiError> {
    let value = match value {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::String(s)) if s.is_empty() => return Ok(None),
        Some(v) => v,
    };

    match json_int(value) {
        Some(amount) if amount >= 0 => Ok(Some(amount)),
        _ => Err(ApiError::BadRequest(format!(
            "Поле {} должно быть целым числом не меньше 0.",
            field
        ))),
    }
}

fn parse_work_shift_value(value: Option<&Value>) -> Result<WorkShift, ApiError> {
    value
        .and_then(Value::as_str)
        .and_then(WorkShift::parse)
        .ok_or_else(|| {
            ApiError::BadRequest("Поле workShift должно быть 'day' или 'night'.".to_string())
        })
}

/// JSON-вариант создания: все поля обязательны, objectPositions — только
/// готовый массив непустых строк.
pub fn parse_json_body(body: &Value) -> Result<CreateCustomerBody, ApiError> {
    if !body.is_object() {
        return Err(ApiError::BadRequest(
            "Тело запроса должно быть корректным JSON-объектом.".to_string(),
        ));
    }

    let username = required_string(body.get("username"), "username")?;

    let avatar_src = match body.get("avatar") {
        Some(avatar) if avatar.is_object() => {
            required_string(avatar.get("src"), "avatar.src")?
        }
        _ => {
            return Err(ApiError::BadRequest("Поле avatar.src обязательно.".to_string()));
        }
    };

    let password = required_string(body.get("password"), "password")?;
    let phone_number = required_string(body.get("phoneNumber"), "phoneNumber")?;
    let passport_file = required_string(body.get("passportFile"), "passportFile")?;
    let age = parse_age_value(body.get("age"))?;
    let work_shift = parse_work_shift_value(body.get("workShift"))?;
    let object_pinned = required_string(body.get("objectPinned"), "objectPinned")?;
    let base_salary = parse_optional_money(body.get("baseSalary"), "baseSalary")?;
    let position_bonus = parse_optional_money(body.get("positionBonus"), "positionBonus")?;

    let object_positions = match body.get("objectPositions") {
        Some(Value::Array(items)) if !items.is_empty() => {
            let mut positions = Vec::with_capacity(items.len());
            for item in items {
                match item.as_str().map(str::trim) {
                    Some(position) if !position.is_empty() => {
                        positions.push(position.to_string())
                    }
                    _ => {
                        return Err(ApiError::BadRequest(
                            "objectPositions должен быть непустым массивом строк.".to_string(),
                        ));
                    }
                }
            }
            positions
        }
        _ => {
            return Err(ApiError::BadRequest(
                "objectPositions должен быть непустым массивом строк.".to_string(),
            ));
        }
    };

    Ok(CreateCustomerBody {
        username,
        avatar: Avatar { src: avatar_src },
        password,
        phone_number,
        passport_file,
        age,
        work_shift,
        object_pinned,
        object_positions,
        base_salary,
        position_bonus,
    })
}

// ============================================================================
// Разбор multipart-тела создания (с загрузкой файлов в storage)
// ============================================================================

struct FilePart {
    filename: String,
    content_type: Option<String>,
    data: Vec<u8>,
}

fn required_field(fields: &HashMap<String, String>, field: &str) -> Result<String, ApiError> {
    let text = fields.get(field).map(|v| v.trim()).unwrap_or("");
    if text.is_empty() {
        return Err(ApiError::BadRequest(format!("Поле {} обязательно.", field)));
    }
    Ok(text.to_string())
}

fn parse_age_field(fields: &HashMap<String, String>) -> Result<i64, ApiError> {
    let age = fields
        .get("age")
        .and_then(|v| v.trim().parse::<i64>().ok())
        .unwrap_or(-1);
    if age < 18 {
        return Err(ApiError::BadRequest(
            "Возраст должен быть целым числом не меньше 18.".to_string(),
        ));
    }
    Ok(age)
}

fn parse_money_field(
    fields: &HashMap<String, String>,
    field: &str,
) -> Result<Option<i64>, ApiError> {
    let raw = match fields.get(field) {
        None => return Ok(None),
        Some(v) if v.is_empty() => return Ok(None),
        Some(v) => v.trim(),
    };
    match raw.parse::<i64>() {
        Ok(amount) if amount >= 0 => Ok(Some(amount)),
        _ => Err(ApiError::BadRequest(format!(
            "Поле {} должно быть целым числом не меньше 0.",
            field
        ))),
    }
}

fn parse_positions_field(fields: &HashMap<String, String>) -> Result<Vec<String>, ApiError> {
    let raw = fields.get("objectPositions").map(|v| v.trim()).unwrap_or("");
    if raw.is_empty() {
        return Err(ApiError::BadRequest("Поле objectPositions обязательно.".to_string()));
    }

    let positions = parse_object_positions(&PositionsValue::Text(raw.to_string()));
    if positions.is_empty() {
        return Err(ApiError::BadRequest(
            "objectPositions должен быть непустым массивом строк.".to_string(),
        ));
    }
    Ok(positions)
}

/// Сегмент пути в storage: нижний регистр, серии недопустимых символов
/// заменяются на дефис, крайние дефисы срезаются.
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
        "customer".to_string()
    } else {
        trimmed
    }
}

fn sanitize_file_name(value: &str) -> String {
    let lowered = value.to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    for ch in lowered.chars() {
        let allowed =
            ch.is_ascii_lowercase() || ch.is_ascii_digit() || matches!(ch, '.' | '_');
        if allowed {
            out.push(ch);
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    out
}

/// multipart-вариант: текстовые поля плюс два файла. Аватар и паспорт
/// загружаются в свои бакеты, в тело попадают ссылка и путь.
pub async fn parse_multipart_body(
    multipart: &mut Multipart,
) -> Result<CreateCustomerBody, ApiError> {
    let mut fields: HashMap<String, String> = HashMap::new();
    let mut avatar_file: Option<FilePart> = None;
    let mut passport_file: Option<FilePart> = None;
    let mut has_parts = false;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::BadRequest("Данные multipart/form-data пусты.".to_string()))?
    {
        has_parts = true;
        let name = match field.name() {
            Some(name) => name.to_string(),
            None => continue,
        };

        if let Some(filename) = field.file_name().map(str::to_string) {
            let content_type = field.content_type().map(str::to_string);
            let data = field
                .bytes()
                .await
                .map_err(|_| {
                    ApiError::BadRequest("Данные multipart/form-data пусты.".to_string())
                })?
                .to_vec();
            let part = FilePart {
                filename,
                content_type,
                data,
            };
            if name == "avatarFile" {
                avatar_file = Some(part);
            } else if name == "passportFile" {
                passport_file = Some(part);
            }
            continue;
        }

        let value = field.text().await.map_err(|_| {
            ApiError::BadRequest("Данные multipart/form-data пусты.".to_string())
        })?;
        fields.insert(name, value);
    }

    if !has_parts {
        return Err(ApiError::BadRequest("Данные multipart/form-data пусты.".to_string()));
    }

    let username = required_field(&fields, "username")?;
    let password = required_field(&fields, "password")?;
    let phone_number = required_field(&fields, "phoneNumber")?;
    let object_pinned = required_field(&fields, "objectPinned")?;
    let age = parse_age_field(&fields)?;
    let work_shift_raw = required_field(&fields, "workShift")?;
    let object_positions = parse_positions_field(&fields)?;
    let base_salary = parse_money_field(&fields, "baseSalary")?;
    let position_bonus = parse_money_field(&fields, "positionBonus")?;

    let work_shift = WorkShift::parse(&work_shift_raw).ok_or_else(|| {
        ApiError::BadRequest("Поле workShift должно быть 'day' или 'night'.".to_string())
    })?;

    let avatar_file = avatar_file
        .ok_or_else(|| ApiError::BadRequest("Поле avatarFile обязательно.".to_string()))?;
    let passport_file = passport_file
        .ok_or_else(|| ApiError::BadRequest("Поле passportFile обязательно.".to_string()))?;

    let avatar_is_image = avatar_file
        .content_type
        .as_deref()
        .map(|t| t.starts_with("image/"))
        .unwrap_or(false);
    if !avatar_is_image {
        return Err(ApiError::BadRequest(
            "Файл avatarFile должен быть изображением.".to_string(),
        ));
    }

    let supabase = &config::get().supabase;
    let storage_client = storage::client()?;

    for (bucket, public) in [
        (supabase.avatar_bucket.as_str(), true),
        (supabase.passport_bucket.as_str(), false),
    ] {
        storage_client.ensure_bucket(bucket, public).await.map_err(|e| {
            tracing::error!("Failed to ensure bucket {}: {}", bucket, e);
            ApiError::Internal(format!(
                "Не удалось подготовить бакет хранилища \"{}\".",
                bucket
            ))
        })?;
    }

    let safe_username = sanitize_path_segment(&username);
    let unique_id = format!(
        "{}-{}",
        chrono::Utc::now().timestamp_millis(),
        uuid::Uuid::new_v4()
    );
    let avatar_name = sanitize_file_name(if avatar_file.filename.is_empty() {
        "avatar"
    } else {
        &avatar_file.filename
    });
    let passport_name = sanitize_file_name(if passport_file.filename.is_empty() {
        "passport"
    } else {
        &passport_file.filename
    });
    let avatar_path = format!("{}/avatars/{}-{}", safe_username, unique_id, avatar_name);
    let passport_path = format!("{}/passports/{}-{}", safe_username, unique_id, passport_name);

    upload_part(&supabase.avatar_bucket, &avatar_path, avatar_file).await?;
    let passport_bucket = supabase.passport_bucket.clone();
    upload_part(&passport_bucket, &passport_path, passport_file).await?;

    Ok(CreateCustomerBody {
        username,
        avatar: Avatar {
            src: storage_client.public_object_url(&supabase.avatar_bucket, &avatar_path),
        },
        password,
        phone_number,
        passport_file: format!("{}/{}", passport_bucket, passport_path),
        age,
        work_shift,
        object_pinned,
        object_positions,
        base_salary,
        position_bonus,
    })
}

async fn upload_part(bucket: &str, path: &str, part: FilePart) -> Result<(), ApiError> {
    let content_type = part
        .content_type
        .unwrap_or_else(|| "application/octet-stream".to_string());
    storage::client()?
        .upload_object(bucket, path, part.data, &content_type)
        .await
        .map_err(|e| {
            tracing::error!("Failed to upload object {}/{}: {}", bucket, path, e);
            ApiError::BadRequest(format!(
                "Не удалось загрузить файл в бакет \"{}\".",
                bucket
            ))
        })
}

// ============================================================================
// Разбор PATCH-тела
// ============================================================================

pub fn parse_update_body(body: &Value) -> Result<UpdateCustomerBody, ApiError> {
    if !body.is_object() {
        return Err(ApiError::BadRequest(
            "Тело запроса должно быть корректным JSON-объектом.".to_string(),
        ));
    }

    let mut update = UpdateCustomerBody::default();

    if let Some(value) = body.get("workShift") {
        update.work_shift = Some(parse_work_shift_value(Some(value))?);
    }

    if let Some(value) = body.get("baseSalary") {
        update.base_salary = Some(parse_required_money(value, "baseSalary")?);
    }

    if let Some(value) = body.get("positionBonus") {
        update.position_bonus = Some(parse_required_money(value, "positionBonus")?);
    }

    if update.is_empty() {
        return Err(ApiError::BadRequest(
            "Нужно передать хотя бы одно поле для обновления.".to_string(),
        ));
    }

    Ok(update)
}

fn parse_required_money(value: &Value, field: &str) -> Result<i64, ApiError> {
    match json_int(value) {
        Some(amount) if amount >= 0 => Ok(amount),
        _ => Err(ApiError::BadRequest(format!(
            "Поле {} должно быть целым числом не меньше 0.",
            field
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_body_happy_path() {
        let body = json!({
            "username": "john.smith",
            "avatar": { "src": "https://example.com/a.png" },
            "password": "secret1",
            "phoneNumber": "+998901112233",
            "passportFile": "passports/john.pdf",
            "age": "28",
            "workShift": "day",
            "objectPinned": "Корпус A",
            "objectPositions": ["Пост 1", " Пост 2 "],
            "baseSalary": 1500000
        });
        let parsed = parse_json_body(&body).unwrap();
        assert_eq!(parsed.age, 28);
        assert_eq!(parsed.object_positions, vec!["Пост 1", "Пост 2"]);
        assert_eq!(parsed.base_salary, Some(1_500_000));
        assert_eq!(parsed.position_bonus, None);
    }

    #[test]
    fn json_body_requires_avatar_src() {
        let body = json!({ "username": "john.smith" });
        let err = parse_json_body(&body).unwrap_err();
        assert_eq!(err.to_string(), "Поле avatar.src обязательно.");
    }

    #[test]
    fn json_body_rejects_underage() {
        let body = json!({
            "username": "john.smith",
            "avatar": { "src": "a" },
            "password": "secret1",
            "phoneNumber": "+998901112233",
            "passportFile": "f",
            "age": 17,
            "workShift": "day",
            "objectPinned": "Корпус A",
            "objectPositions": ["Пост 1"]
        });
        let err = parse_json_body(&body).unwrap_err();
        assert!(err.to_string().contains("Возраст"));
    }

    #[test]
    fn json_body_rejects_non_string_positions() {
        let body = json!({
            "username": "john.smith",
            "avatar": { "src": "a" },
            "password": "secret1",
            "phoneNumber": "+998901112233",
            "passportFile": "f",
            "age": 20,
            "workShift": "night",
            "objectPinned": "Корпус A",
            "objectPositions": ["Пост 1", 5]
        });
        let err = parse_json_body(&body).unwrap_err();
        assert!(err.to_string().contains("objectPositions"));
    }

    #[test]
    fn update_body_needs_at_least_one_field() {
        let err = parse_update_body(&json!({})).unwrap_err();
        assert!(err.to_string().contains("хотя бы одно поле"));
    }

    #[test]
    fn update_body_validates_each_field() {
        let parsed = parse_update_body(&json!({
            "workShift": "night",
            "positionBonus": 50000
        }))
        .unwrap();
        assert_eq!(parsed.work_shift, Some(WorkShift::Night));
        assert_eq!(parsed.position_bonus, Some(50_000));
        assert!(parsed.base_salary.is_none());

        let err = parse_update_body(&json!({ "baseSalary": -5 })).unwrap_err();
        assert!(err.to_string().contains("baseSalary"));

        let err = parse_update_body(&json!({ "workShift": "evening" })).unwrap_err();
        assert!(err.to_string().contains("workShift"));
    }

    #[test]
    fn path_segment_sanitization() {
        assert_eq!(sanitize_path_segment("John Smith"), "john-smith");
        assert_eq!(sanitize_path_segment("Иван"), "customer");
        assert_eq!(sanitize_path_segment("a-!b"), "a--b");
        assert_eq!(sanitize_path_segment("--x--"), "x");
    }

    #[test]
    fn file_name_sanitization_collapses_dashes() {
        assert_eq!(sanitize_file_name("Фото Сотрудника.PNG"), "-.png");
        assert_eq!(sanitize_file_name("scan (1).pdf"), "scan-1-.pdf");
        assert_eq!(sanitize_file_name("passport.pdf"), "passport.pdf");
    }
}
