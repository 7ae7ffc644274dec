use serde::{Deserialize, Serialize};

/// Рабочая смена сотрудника.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkShift {
    Day,
    Night,
}

impl WorkShift {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "day" => Some(WorkShift::Day),
            "night" => Some(WorkShift::Night),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkShift::Day => "day",
            WorkShift::Night => "night",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Avatar {
    pub src: String,
}

pub const DEFAULT_BASE_SALARY: i64 = 1_000_000;
pub const DEFAULT_POSITION_BONUS: i64 = 0;
pub const SALARY_CURRENCY: &str = "UZS";

/// Клиент (сотрудник) в формате API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerRecord {
    pub id: i64,
    pub username: String,
    pub avatar: Avatar,
    pub password: String,
    #[serde(rename = "phoneNumber")]
    pub phone_number: String,
    #[serde(rename = "passportFile")]
    pub passport_file: String,
    pub age: i64,
    #[serde(rename = "workShift")]
    pub work_shift: WorkShift,
    #[serde(rename = "objectPinned")]
    pub object_pinned: String,
    #[serde(rename = "objectPositions")]
    pub object_positions: Vec<String>,
    #[serde(rename = "baseSalary")]
    pub base_salary: i64,
    #[serde(rename = "positionBonus")]
    pub position_bonus: i64,
    #[serde(rename = "salaryCurrency")]
    pub salary_currency: String,
}

/// Проверенное каноническое тело создания клиента.
#[derive(Debug, Clone)]
pub struct CreateCustomerBody {
    pub username: String,
    pub avatar: Avatar,
    pub password: String,
    pub phone_number: String,
    pub passport_file: String,
    pub age: i64,
    pub work_shift: WorkShift,
    pub object_pinned: String,
    pub object_positions: Vec<String>,
    pub base_salary: Option<i64>,
    pub position_bonus: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateCustomerBody {
    pub work_shift: Option<WorkShift>,
    pub base_salary: Option<i64>,
    pub position_bonus: Option<i64>,
}

impl UpdateCustomerBody {
    pub fn is_empty(&self) -> bool {
        self.work_shift.is_none() && self.base_salary.is_none() && self.position_bonus.is_none()
    }
}

/// Строка таблицы customers как её возвращает хранилище.
/// Колонки зарплаты опциональны: старая схема может их не иметь.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerDbRow {
    pub id: i64,
    pub username: String,
    pub avatar: String,
    pub password: String,
    pub phone_number: String,
    pub passport_file: String,
    pub age: i64,
    pub work_shift: WorkShift,
    pub object_pinned: String,
    pub object_positions: Vec<String>,
    #[serde(default)]
    pub base_salary: Option<i64>,
    #[serde(default)]
    pub position_bonus: Option<i64>,
    #[serde(default)]
    pub salary_currency: Option<String>,
}

/// Урезанная выборка для проверки дублей.
#[derive(Debug, Clone, Deserialize)]
pub struct CustomerCredentialRow {
    pub id: i64,
    pub username: String,
    pub phone_number: String,
}

/// Строка для вставки в customers.
#[derive(Debug, Clone, Serialize)]
pub struct CustomerDbInsert {
    pub username: String,
    pub avatar: String,
    pub password: String,
    pub phone_number: String,
    pub passport_file: String,
    pub age: i64,
    pub work_shift: WorkShift,
    pub object_pinned: String,
    pub object_positions: Vec<String>,
    pub base_salary: i64,
    pub position_bonus: i64,
    pub salary_currency: String,
}

/// Частичный PATCH по customers.
#[derive(Debug, Clone, Serialize)]
pub struct CustomerDbUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_shift: Option<WorkShift>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_salary: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_bonus: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImportRowError {
    pub row: usize,
    pub message: String,
}

/// Итог массового импорта.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
    pub errors: Vec<ImportRowError>,
}

pub fn map_customer_db_row_to_record(row: CustomerDbRow) -> CustomerRecord {
    CustomerRecord {
        id: row.id,
        username: row.username,
        avatar: Avatar { src: row.avatar },
        password: row.password,
        phone_number: row.phone_number,
        passport_file: row.passport_file,
        age: row.age,
        work_shift: row.work_shift,
        object_pinned: row.object_pinned,
        object_positions: row.object_positions,
        base_salary: row.base_salary.unwrap_or(DEFAULT_BASE_SALARY),
        position_bonus: row.position_bonus.unwrap_or(DEFAULT_POSITION_BONUS),
        salary_currency: row.salary_currency.unwrap_or_else(|| SALARY_CURRENCY.to_string()),
    }
}

pub fn map_create_body_to_db_insert(body: CreateCustomerBody) -> CustomerDbInsert {
    CustomerDbInsert {
        username: body.username,
        avatar: body.avatar.src,
        password: body.password,
        phone_number: body.phone_number,
        passport_file: body.passport_file,
        age: body.age,
        work_shift: body.work_shift,
        object_pinned: body.object_pinned,
        object_positions: body.object_positions,
        base_salary: body.base_salary.unwrap_or(DEFAULT_BASE_SALARY),
        position_bonus: body.position_bonus.unwrap_or(DEFAULT_POSITION_BONUS),
        salary_currency: SALARY_CURRENCY.to_string(),
    }
}

pub fn map_update_body_to_db_update(body: &UpdateCustomerBody) -> CustomerDbUpdate {
    CustomerDbUpdate {
        work_shift: body.work_shift,
        base_salary: body.base_salary,
        position_bonus: body.position_bonus,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_row() -> CustomerDbRow {
        CustomerDbRow {
            id: 7,
            username: "john.smith".into(),
            avatar: "https://i.pravatar.cc/128?u=john.smith".into(),
            password: "StrongPass123".into(),
            phone_number: "+998901112233".into(),
            passport_file: "bulk-import/john-smith.pdf".into(),
            age: 28,
            work_shift: WorkShift::Day,
            object_pinned: "Корпус A".into(),
            object_positions: vec!["Пост 1".into(), "Пост 2".into()],
            base_salary: None,
            position_bonus: None,
            salary_currency: None,
        }
    }

    #[test]
    fn row_mapping_defaults_salary_columns() {
        let record = map_customer_db_row_to_record(sample_row());
        assert_eq!(record.base_salary, DEFAULT_BASE_SALARY);
        assert_eq!(record.position_bonus, DEFAULT_POSITION_BONUS);
        assert_eq!(record.salary_currency, "UZS");
    }

    #[test]
    fn legacy_row_without_salary_columns_deserializes() {
        let json = r#"{
            "id": 1,
            "username": "john.smith",
            "avatar": "a",
            "password": "p",
            "phone_number": "+998901112233",
            "passport_file": "f",
            "age": 28,
            "work_shift": "night",
            "object_pinned": "Корпус A",
            "object_positions": ["Пост 1"]
        }"#;
        let row: CustomerDbRow = serde_json::from_str(json).unwrap();
        assert_eq!(row.work_shift, WorkShift::Night);
        assert!(row.base_salary.is_none());
    }

    #[test]
    fn insert_mapping_applies_defaults() {
        let body = CreateCustomerBody {
            username: "john.smith".into(),
            avatar: Avatar { src: "a".into() },
            password: "secret1".into(),
            phone_number: "+998901112233".into(),
            passport_file: "f".into(),
            age: 30,
            work_shift: WorkShift::Night,
            object_pinned: "Корпус A".into(),
            object_positions: vec!["Пост 1".into()],
            base_salary: None,
            position_bonus: Some(50_000),
        };
        let insert = map_create_body_to_db_insert(body);
        assert_eq!(insert.base_salary, DEFAULT_BASE_SALARY);
        assert_eq!(insert.position_bonus, 50_000);
        assert_eq!(insert.salary_currency, "UZS");
    }

    #[test]
    fn partial_update_skips_absent_fields() {
        let update = map_update_body_to_db_update(&UpdateCustomerBody {
            work_shift: Some(WorkShift::Day),
            base_salary: None,
            position_bonus: None,
        });
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json, serde_json::json!({ "work_shift": "day" }));
    }
}
