use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use contracts::domain::customers::{
    map_create_body_to_db_insert, Avatar, CreateCustomerBody, CustomerCredentialRow,
    CustomerDbInsert, CustomerDbRow, ImportRowError, ImportSummary, WorkShift,
    DEFAULT_BASE_SALARY, DEFAULT_POSITION_BONUS,
};

use crate::shared::error::ApiError;
use crate::shared::spreadsheet::write_csv;

// ============================================================================
// SourceRow: нормализация строки таблицы
// ============================================================================

/// Сырая строка импорта после приведения заголовков. Все значения —
/// отображаемые строки; отсутствующие поля отбраковываются валидаторами.
#[derive(Debug, Default)]
pub struct SourceRow {
    pub username: Option<String>,
    pub password: Option<String>,
    pub phone_number: Option<String>,
    pub age: Option<String>,
    pub work_shift: Option<String>,
    pub object_pinned: Option<String>,
    pub object_positions: Option<String>,
    pub base_salary: Option<String>,
    pub position_bonus: Option<String>,
    pub avatar_url: Option<String>,
    pub passport_file: Option<String>,
}

fn pick(raw: &HashMap<String, String>, camel: &str, snake: &str) -> Option<String> {
    raw.get(camel).or_else(|| raw.get(snake)).cloned()
}

/// camelCase-заголовки в приоритете, snake_case — как запасной вариант.
pub fn normalize_row(raw: &HashMap<String, String>) -> SourceRow {
    SourceRow {
        username: raw.get("username").cloned(),
        password: raw.get("password").cloned(),
        phone_number: pick(raw, "phoneNumber", "phone_number"),
        age: raw.get("age").cloned(),
        work_shift: pick(raw, "workShift", "work_shift"),
        object_pinned: pick(raw, "objectPinned", "object_pinned"),
        object_positions: pick(raw, "objectPositions", "object_positions"),
        base_salary: pick(raw, "baseSalary", "base_salary"),
        position_bonus: pick(raw, "positionBonus", "position_bonus"),
        avatar_url: pick(raw, "avatarUrl", "avatar_url"),
        passport_file: pick(raw, "passportFile", "passport_file"),
    }
}

// ============================================================================
// Валидаторы полей (чистые функции)
// ============================================================================

/// Приведение имени пользователя: trim, нижний регистр, любые серии
/// символов вне [a-z0-9._-] схлопываются в одну точку, повторные точки
/// тоже, крайние точки срезаются.
pub fn sanitize_username(value: &str) -> String {
    let lowered = value.trim().to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    for ch in lowered.chars() {
        let allowed =
            ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '_' || ch == '-';
        if allowed {
            out.push(ch);
        } else if !out.ends_with('.') {
            out.push('.');
        }
    }
    out.trim_matches('.').to_string()
}

/// Телефон: ведущий `+` сохраняется, все нецифры выбрасываются,
/// минимум 9 цифр.
pub fn normalize_phone(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let has_plus = trimmed.starts_with('+');
    let digits: String = trimmed.chars().filter(|c| c.is_ascii_digit()).collect();

    if digits.len() < 9 {
        return None;
    }

    Some(if has_plus { format!("+{}", digits) } else { digits })
}

/// Необязательное неотрицательное целое: пустое значение даёт fallback,
/// всё непарсящееся или отрицательное — None (отказ).
pub fn parse_non_negative_int(value: Option<&str>, fallback: i64) -> Option<i64> {
    let raw = match value {
        None => return Some(fallback),
        Some(v) => v.trim(),
    };
    if raw.is_empty() {
        return Some(fallback);
    }

    match raw.parse::<i64>() {
        Ok(parsed) if parsed >= 0 => Some(parsed),
        _ => None,
    }
}

/// Возраст: fallback -1 гарантирует отказ для пустого значения.
pub fn parse_age(value: Option<&str>) -> Option<i64> {
    let age = parse_non_negative_int(value, -1)?;
    if age < 18 {
        None
    } else {
        Some(age)
    }
}

/// Поле позиций приходит либо готовым списком (JSON API), либо строкой
/// (таблица) — единая точка нормализации для обоих вариантов.
#[derive(Debug, Clone)]
pub enum PositionsValue {
    List(Vec<String>),
    Text(String),
}

pub fn parse_object_positions(value: &PositionsValue) -> Vec<String> {
    match value {
        PositionsValue::List(items) => items
            .iter()
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty())
            .collect(),
        PositionsValue::Text(text) => parse_positions_text(text),
    }
}

/// Строка вида `["Пост 1","Пост 2"]` разбирается как JSON-массив;
/// при неудаче — запасной разбор через запятую.
pub fn parse_positions_text(value: &str) -> Vec<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    if trimmed.starts_with('[') {
        if let Ok(serde_json::Value::Array(items)) =
            serde_json::from_str::<serde_json::Value>(trimmed)
        {
            return items
                .iter()
                .map(|item| match item {
                    serde_json::Value::String(s) => s.trim().to_string(),
                    other => other.to_string().trim().to_string(),
                })
                .filter(|item| !item.is_empty())
                .collect();
        }
    }

    trimmed
        .split(',')
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

// ============================================================================
// Duplicate Tracker
// ============================================================================

/// Снимок занятых username/телефонов плюс значения, уже встреченные
/// в текущем файле.
pub struct DuplicateTracker {
    existing_usernames: HashSet<String>,
    existing_phones: HashSet<String>,
    seen_usernames: HashSet<String>,
    seen_phones: HashSet<String>,
}

impl DuplicateTracker {
    pub fn from_existing(rows: &[CustomerCredentialRow]) -> Self {
        let existing_usernames = rows
            .iter()
            .map(|row| row.username.trim().to_lowercase())
            .collect();
        let existing_phones = rows
            .iter()
            .filter_map(|row| normalize_phone(&row.phone_number))
            .collect();
        Self {
            existing_usernames,
            existing_phones,
            seen_usernames: HashSet::new(),
            seen_phones: HashSet::new(),
        }
    }

    pub fn username_taken(&self, username: &str) -> bool {
        self.existing_usernames.contains(username) || self.seen_usernames.contains(username)
    }

    pub fn phone_in_storage(&self, phone: &str) -> bool {
        self.existing_phones.contains(phone)
    }

    pub fn phone_seen_in_file(&self, phone: &str) -> bool {
        self.seen_phones.contains(phone)
    }

    pub fn remember(&mut self, username: String, phone: String) {
        self.seen_usernames.insert(username);
        self.seen_phones.insert(phone);
    }
}

// ============================================================================
// Построчная проверка
// ============================================================================

/// Проверка строки по каскаду: username -> дубли -> password -> телефон ->
/// дубли телефона -> возраст -> смена -> объект -> позиции -> оклад -> бонус.
/// Первый отказ завершает строку; порядок закреплён поведением API.
fn validate_row(
    row: &SourceRow,
    tracker: &mut DuplicateTracker,
) -> Result<CustomerDbInsert, String> {
    let username = sanitize_username(row.username.as_deref().unwrap_or(""));
    if username.len() < 3 {
        return Err("username is required and must be at least 3 chars.".to_string());
    }

    if tracker.username_taken(&username) {
        return Err(format!("username \"{}\" already exists.", username));
    }

    let password = row.password.as_deref().unwrap_or("").trim().to_string();
    if password.len() < 6 {
        return Err("password is required and must be at least 6 chars.".to_string());
    }

    let phone_number = match normalize_phone(row.phone_number.as_deref().unwrap_or("")) {
        Some(phone) => phone,
        None => return Err("phoneNumber is required and must be valid.".to_string()),
    };

    if tracker.phone_in_storage(&phone_number) {
        return Err(format!("phone {} already exists in database.", phone_number));
    }

    if tracker.phone_seen_in_file(&phone_number) {
        return Err(format!("phone {} is duplicated in file.", phone_number));
    }

    let age = match parse_age(row.age.as_deref()) {
        Some(age) => age,
        None => return Err("age must be integer and >= 18.".to_string()),
    };

    let work_shift = match row.work_shift.as_deref().and_then(WorkShift::parse) {
        Some(shift) => shift,
        None => return Err("workShift must be \"day\" or \"night\".".to_string()),
    };

    let object_pinned = row.object_pinned.as_deref().unwrap_or("").trim().to_string();
    if object_pinned.is_empty() {
        return Err("objectPinned is required.".to_string());
    }

    let object_positions = parse_object_positions(&PositionsValue::Text(
        row.object_positions.clone().unwrap_or_default(),
    ));
    if object_positions.is_empty() {
        return Err("objectPositions must contain at least one item.".to_string());
    }

    let base_salary =
        match parse_non_negative_int(row.base_salary.as_deref(), DEFAULT_BASE_SALARY) {
            Some(amount) => amount,
            None => return Err("baseSalary must be integer >= 0.".to_string()),
        };

    let position_bonus =
        match parse_non_negative_int(row.position_bonus.as_deref(), DEFAULT_POSITION_BONUS) {
            Some(amount) => amount,
            None => return Err("positionBonus must be integer >= 0.".to_string()),
        };

    let avatar_src = match row.avatar_url.as_deref().map(str::trim) {
        Some(src) if !src.is_empty() => src.to_string(),
        _ => format!(
            "https://i.pravatar.cc/128?u={}",
            urlencoding::encode(&username)
        ),
    };

    let passport_file = match row.passport_file.as_deref().map(str::trim) {
        Some(path) if !path.is_empty() => path.to_string(),
        _ => format!("bulk-import/{}.pdf", username),
    };

    tracker.remember(username.clone(), phone_number.clone());

    Ok(map_create_body_to_db_insert(CreateCustomerBody {
        username,
        avatar: Avatar { src: avatar_src },
        password,
        phone_number,
        passport_file,
        age,
        work_shift,
        object_pinned,
        object_positions,
        base_salary: Some(base_salary),
        position_bonus: Some(position_bonus),
    }))
}

// ============================================================================
// Оркестратор импорта
// ============================================================================

/// Доступ импорта к хранилищу. Вынесен в трейт, чтобы снимок занятых
/// значений и пакетную вставку можно было подменять в тестах
/// (включая гонку «снимок устарел к моменту вставки»).
#[async_trait]
pub trait CustomerImportRepository: Send + Sync {
    async fn fetch_credentials(&self) -> anyhow::Result<Vec<CustomerCredentialRow>>;
    async fn insert_batch(
        &self,
        rows: Vec<CustomerDbInsert>,
    ) -> anyhow::Result<Vec<CustomerDbRow>>;
}

pub struct BulkImporter<R>
where
    R: CustomerImportRepository + ?Sized,
{
    repo: Arc<R>,
}

impl<R> BulkImporter<R>
where
    R: CustomerImportRepository + ?Sized,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Прогон файла: снимок занятых значений -> построчная проверка в
    /// порядке файла -> одна пакетная вставка. Ошибки строк собираются,
    /// сетевой сбой вставки валит весь запрос.
    pub async fn import(
        &self,
        raw_rows: &[HashMap<String, String>],
    ) -> Result<ImportSummary, ApiError> {
        let existing = self.repo.fetch_credentials().await.map_err(|e| {
            tracing::error!("Failed to fetch existing customers: {}", e);
            ApiError::Internal(e.to_string())
        })?;

        let mut tracker = DuplicateTracker::from_existing(&existing);
        let mut errors: Vec<ImportRowError> = Vec::new();
        let mut staged: Vec<CustomerDbInsert> = Vec::new();

        for (index, raw) in raw_rows.iter().enumerate() {
            // +2: нумерация листа с единицы плюс строка заголовка.
            let row_number = index + 2;
            let row = normalize_row(raw);

            match validate_row(&row, &mut tracker) {
                Ok(insert) => staged.push(insert),
                Err(message) => errors.push(ImportRowError {
                    row: row_number,
                    message,
                }),
            }
        }

        if staged.is_empty() {
            return Ok(ImportSummary {
                imported: 0,
                skipped: raw_rows.len(),
                errors,
            });
        }

        let created = self.repo.insert_batch(staged).await.map_err(|e| {
            tracing::error!("Bulk customer insert failed: {}", e);
            ApiError::BadRequest(e.to_string())
        })?;

        let imported = created.len();
        Ok(ImportSummary {
            imported,
            skipped: raw_rows.len() - imported,
            errors,
        })
    }
}

// ============================================================================
// Шаблон импорта
// ============================================================================

pub const TEMPLATE_HEADERS: [&str; 11] = [
    "username",
    "password",
    "phoneNumber",
    "age",
    "workShift",
    "objectPinned",
    "objectPositions",
    "baseSalary",
    "positionBonus",
    "avatarUrl",
    "passportFile",
];

/// CSV-шаблон с одной строкой-примером.
pub fn import_template_csv() -> String {
    let example = vec![
        "john.smith".to_string(),
        "StrongPass123".to_string(),
        "+998901112233".to_string(),
        "28".to_string(),
        "day".to_string(),
        "Корпус A".to_string(),
        "Пост 1,Пост 2".to_string(),
        "1000000".to_string(),
        "100000".to_string(),
        "https://i.pravatar.cc/128?u=john.smith".to_string(),
        "bulk-import/john-smith.pdf".to_string(),
    ];
    write_csv(&TEMPLATE_HEADERS, &[example])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // ------------------------------------------------------------------
    // Чистые валидаторы
    // ------------------------------------------------------------------

    #[test]
    fn username_is_sanitized() {
        assert_eq!(sanitize_username("John.Smith"), "john.smith");
        assert_eq!(sanitize_username("  Anna Karimova "), "anna.karimova");
        assert_eq!(sanitize_username("..john..smith.."), "john.smith");
        assert_eq!(sanitize_username("a_b-c.d"), "a_b-c.d");
        assert_eq!(sanitize_username("Иван"), "");
    }

    #[test]
    fn username_sanitization_is_idempotent() {
        for raw in ["John Smith!", "  mix.of+chars  ", "уже.не.ascii", "ok_name-1"] {
            let once = sanitize_username(raw);
            assert_eq!(sanitize_username(&once), once);
        }
    }

    #[test]
    fn phone_normalization_matches_policy() {
        assert_eq!(
            normalize_phone("+998 90 111-22-33").as_deref(),
            Some("+998901112233")
        );
        assert_eq!(normalize_phone("90 111 22 33").as_deref(), Some("901112233"));
        assert_eq!(normalize_phone("123"), None);
        assert_eq!(normalize_phone(""), None);
    }

    #[test]
    fn positions_accept_json_array_and_comma_list() {
        assert_eq!(
            parse_positions_text(r#"["Пост 1","Пост 2"]"#),
            vec!["Пост 1", "Пост 2"]
        );
        assert_eq!(
            parse_positions_text("Пост 1,Пост 2"),
            vec!["Пост 1", "Пост 2"]
        );
        assert!(parse_positions_text("").is_empty());
    }

    #[test]
    fn broken_json_positions_fall_back_to_comma_split() {
        assert_eq!(parse_positions_text(r#"["Пост 1", "#), vec!["[\"Пост 1\""]);
        assert_eq!(parse_positions_text("[не json], Пост 2"), vec!["[не json]", "Пост 2"]);
    }

    #[test]
    fn positions_list_variant_trims_and_drops_empty() {
        let value = PositionsValue::List(vec![
            " Пост 1 ".to_string(),
            String::new(),
            "Пост 2".to_string(),
        ]);
        assert_eq!(parse_object_positions(&value), vec!["Пост 1", "Пост 2"]);
    }

    #[test]
    fn age_rules() {
        assert_eq!(parse_age(Some("18")), Some(18));
        assert_eq!(parse_age(Some("17")), None);
        assert_eq!(parse_age(Some("abc")), None);
        assert_eq!(parse_age(Some("18.5")), None);
        assert_eq!(parse_age(None), None);
        assert_eq!(parse_age(Some("")), None);
    }

    #[test]
    fn money_defaults_and_rejections() {
        assert_eq!(parse_non_negative_int(None, 1_000_000), Some(1_000_000));
        assert_eq!(parse_non_negative_int(Some(""), 0), Some(0));
        assert_eq!(parse_non_negative_int(Some("250000"), 0), Some(250_000));
        assert_eq!(parse_non_negative_int(Some("-1"), 0), None);
        assert_eq!(parse_non_negative_int(Some("10.5"), 0), None);
    }

    #[test]
    fn normalizer_prefers_camel_case_keys() {
        let mut raw = HashMap::new();
        raw.insert("phoneNumber".to_string(), "+998901112233".to_string());
        raw.insert("phone_number".to_string(), "ignored".to_string());
        raw.insert("work_shift".to_string(), "night".to_string());
        let row = normalize_row(&raw);
        assert_eq!(row.phone_number.as_deref(), Some("+998901112233"));
        assert_eq!(row.work_shift.as_deref(), Some("night"));
        assert!(row.username.is_none());
    }

    // ------------------------------------------------------------------
    // Оркестратор с подменённым хранилищем
    // ------------------------------------------------------------------

    struct MockRepo {
        existing: Mutex<Vec<CustomerCredentialRow>>,
        fail_insert: bool,
    }

    impl MockRepo {
        fn new(existing: Vec<(&str, &str)>) -> Self {
            let rows = existing
                .into_iter()
                .enumerate()
                .map(|(i, (username, phone))| CustomerCredentialRow {
                    id: i as i64 + 1,
                    username: username.to_string(),
                    phone_number: phone.to_string(),
                })
                .collect();
            Self {
                existing: Mutex::new(rows),
                fail_insert: false,
            }
        }

        fn failing() -> Self {
            Self {
                existing: Mutex::new(Vec::new()),
                fail_insert: true,
            }
        }
    }

    #[async_trait]
    impl CustomerImportRepository for MockRepo {
        async fn fetch_credentials(&self) -> anyhow::Result<Vec<CustomerCredentialRow>> {
            Ok(self.existing.lock().unwrap().clone())
        }

        async fn insert_batch(
            &self,
            rows: Vec<CustomerDbInsert>,
        ) -> anyhow::Result<Vec<CustomerDbRow>> {
            if self.fail_insert {
                anyhow::bail!(
                    "duplicate key value violates unique constraint \"customers_username_key\""
                );
            }

            let mut existing = self.existing.lock().unwrap();
            let mut created = Vec::new();
            for row in rows {
                let id = existing.len() as i64 + 1;
                existing.push(CustomerCredentialRow {
                    id,
                    username: row.username.clone(),
                    phone_number: row.phone_number.clone(),
                });
                created.push(CustomerDbRow {
                    id,
                    username: row.username,
                    avatar: row.avatar,
                    password: row.password,
                    phone_number: row.phone_number,
                    passport_file: row.passport_file,
                    age: row.age,
                    work_shift: row.work_shift,
                    object_pinned: row.object_pinned,
                    object_positions: row.object_positions,
                    base_salary: Some(row.base_salary),
                    position_bonus: Some(row.position_bonus),
                    salary_currency: Some(row.salary_currency),
                });
            }
            Ok(created)
        }
    }

    fn file_row(entries: &[(&str, &str)]) -> HashMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn valid_row(username: &str, phone: &str) -> HashMap<String, String> {
        file_row(&[
            ("username", username),
            ("password", "StrongPass123"),
            ("phoneNumber", phone),
            ("age", "28"),
            ("workShift", "day"),
            ("objectPinned", "Корпус A"),
            ("objectPositions", "Пост 1,Пост 2"),
        ])
    }

    #[tokio::test]
    async fn duplicates_against_storage_and_within_file_are_both_rejected() {
        let repo = Arc::new(MockRepo::new(vec![("john.smith", "+998901112233")]));
        let importer = BulkImporter::new(repo);

        let rows = vec![
            valid_row("John.Smith", "+998905556677"),
            valid_row("JOHN.SMITH", "+998905556688"),
        ];
        let summary = importer.import(&rows).await.unwrap();

        assert_eq!(summary.imported, 0);
        assert_eq!(summary.skipped, 2);
        assert_eq!(summary.errors.len(), 2);
        assert_eq!(summary.errors[0].row, 2);
        assert_eq!(summary.errors[1].row, 3);
        assert!(summary.errors[0]
            .message
            .contains("username \"john.smith\" already exists."));
    }

    #[tokio::test]
    async fn three_row_file_reports_age_and_phone_errors() {
        let repo = Arc::new(MockRepo::new(vec![]));
        let importer = BulkImporter::new(repo);

        let mut underage = valid_row("anna.k", "+998907778899");
        underage.insert("age".to_string(), "17".to_string());

        let rows = vec![
            valid_row("john.smith", "+998901112233"),
            underage,
            // телефон дублирует первую строку файла
            valid_row("bobur.t", "+998 90 111 22 33"),
        ];
        let summary = importer.import(&rows).await.unwrap();

        assert_eq!(summary.imported, 1);
        assert_eq!(summary.skipped, 2);
        let error_rows: Vec<usize> = summary.errors.iter().map(|e| e.row).collect();
        assert_eq!(error_rows, vec![3, 4]);
        assert!(summary.errors[0].message.contains("age must be integer"));
        assert!(summary.errors[1]
            .message
            .contains("phone +998901112233 is duplicated in file."));
    }

    #[tokio::test]
    async fn second_import_of_same_file_rejects_every_row() {
        let repo = Arc::new(MockRepo::new(vec![]));
        let importer = BulkImporter::new(Arc::clone(&repo));

        let rows = vec![
            valid_row("john.smith", "+998901112233"),
            valid_row("anna.k", "+998905556677"),
        ];

        let first = importer.import(&rows).await.unwrap();
        assert_eq!(first.imported, 2);
        assert!(first.errors.is_empty());

        let second = importer.import(&rows).await.unwrap();
        assert_eq!(second.imported, 0);
        assert_eq!(second.skipped, 2);
        assert_eq!(second.errors.len(), 2);
    }

    #[tokio::test]
    async fn stale_snapshot_race_fails_whole_import() {
        // Снимок пуст, но вставка натыкается на ограничение хранилища:
        // запрос целиком завершается 400 без частичного результата.
        let repo = Arc::new(MockRepo::failing());
        let importer = BulkImporter::new(repo);

        let rows = vec![valid_row("john.smith", "+998901112233")];
        let err = importer.import(&rows).await.unwrap_err();

        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
        assert!(err.to_string().contains("duplicate key"));
    }

    #[tokio::test]
    async fn zero_valid_rows_skip_the_insert_call() {
        // fail_insert покажет, если вставка всё же случится.
        let repo = Arc::new(MockRepo::failing());
        let importer = BulkImporter::new(repo);

        let rows = vec![file_row(&[("username", "x")])];
        let summary = importer.import(&rows).await.unwrap();

        assert_eq!(summary.imported, 0);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.errors.len(), 1);
        assert_eq!(summary.errors[0].row, 2);
    }

    #[test]
    fn defaults_are_synthesized_for_avatar_and_passport() {
        let mut tracker = DuplicateTracker::from_existing(&[]);
        let row = normalize_row(&valid_row("john.smith", "+998901112233"));
        let insert = validate_row(&row, &mut tracker).unwrap();

        assert_eq!(insert.avatar, "https://i.pravatar.cc/128?u=john.smith");
        assert_eq!(insert.passport_file, "bulk-import/john.smith.pdf");
        assert_eq!(insert.base_salary, DEFAULT_BASE_SALARY);
        assert_eq!(insert.position_bonus, DEFAULT_POSITION_BONUS);
        assert_eq!(insert.salary_currency, "UZS");
    }

    #[test]
    fn cascade_reports_username_collision_before_phone() {
        let existing = vec![CustomerCredentialRow {
            id: 1,
            username: "john.smith".to_string(),
            phone_number: "+998901112233".to_string(),
        }];
        let mut tracker = DuplicateTracker::from_existing(&existing);
        // Строка конфликтует и по имени, и по телефону — отчёт про имя.
        let row = normalize_row(&valid_row("john.smith", "+998901112233"));
        let err = validate_row(&row, &mut tracker).unwrap_err();
        assert!(err.contains("username"));
    }

    #[test]
    fn template_contains_headers_and_example() {
        let csv = import_template_csv();
        assert!(csv.starts_with("username,password,phoneNumber"));
        assert!(csv.contains("john.smith"));
        assert!(csv.contains("\"Пост 1,Пост 2\""));
    }
}
