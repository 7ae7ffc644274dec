use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseStatus {
    Draft,
    Approved,
    Rejected,
    Paid,
}

impl ExpenseStatus {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "draft" => Some(ExpenseStatus::Draft),
            "approved" => Some(ExpenseStatus::Approved),
            "rejected" => Some(ExpenseStatus::Rejected),
            "paid" => Some(ExpenseStatus::Paid),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExpenseStatus::Draft => "draft",
            ExpenseStatus::Approved => "approved",
            ExpenseStatus::Rejected => "rejected",
            ExpenseStatus::Paid => "paid",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExpenseDbRow {
    pub id: i64,
    pub title: String,
    pub category: String,
    pub vendor: String,
    pub planned_amount: i64,
    #[serde(default)]
    pub actual_amount: Option<i64>,
    pub currency: String,
    #[serde(default)]
    pub due_date: Option<String>,
    pub status: ExpenseStatus,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExpenseRecord {
    pub id: i64,
    pub title: String,
    pub category: String,
    pub vendor: String,
    #[serde(rename = "plannedAmount")]
    pub planned_amount: i64,
    #[serde(rename = "actualAmount", skip_serializing_if = "Option::is_none")]
    pub actual_amount: Option<i64>,
    pub currency: String,
    #[serde(rename = "dueDate", skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    pub status: ExpenseStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(rename = "updatedAt")]
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExpenseSummary {
    #[serde(rename = "totalPlanned")]
    pub total_planned: i64,
    #[serde(rename = "totalActual")]
    pub total_actual: i64,
    #[serde(rename = "byStatus")]
    pub by_status: BTreeMap<String, i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExpenseListResponse {
    pub items: Vec<ExpenseRecord>,
    pub summary: ExpenseSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExpenseDbInsert {
    pub title: String,
    pub category: String,
    pub vendor: String,
    pub planned_amount: i64,
    pub actual_amount: Option<i64>,
    pub currency: String,
    pub due_date: Option<String>,
    pub status: ExpenseStatus,
    pub notes: Option<String>,
    pub object_id: i64,
}

pub fn map_expense_db_row_to_record(row: ExpenseDbRow) -> ExpenseRecord {
    ExpenseRecord {
        id: row.id,
        title: row.title,
        category: row.category,
        vendor: row.vendor,
        planned_amount: row.planned_amount,
        actual_amount: row.actual_amount,
        currency: row.currency,
        due_date: row.due_date.filter(|d| !d.is_empty()),
        status: row.status,
        notes: row.notes.filter(|n| !n.is_empty()),
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

/// Сводка по списку: суммы план/факт и количество по каждому статусу.
pub fn summarize_expenses(items: &[ExpenseRecord]) -> ExpenseSummary {
    let mut by_status: BTreeMap<String, i64> = BTreeMap::new();
    for status in ["draft", "approved", "rejected", "paid"] {
        by_status.insert(status.to_string(), 0);
    }

    let mut total_planned = 0;
    let mut total_actual = 0;
    for item in items {
        total_planned += item.planned_amount;
        total_actual += item.actual_amount.unwrap_or(0);
        *by_status.entry(item.status.as_str().to_string()).or_insert(0) += 1;
    }

    ExpenseSummary {
        total_planned,
        total_actual,
        by_status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(planned: i64, actual: Option<i64>, status: ExpenseStatus) -> ExpenseRecord {
        ExpenseRecord {
            id: 0,
            title: "Канцтовары".into(),
            category: "office".into(),
            vendor: "ООО Ромашка".into(),
            planned_amount: planned,
            actual_amount: actual,
            currency: "UZS".into(),
            due_date: None,
            status,
            notes: None,
            created_at: "c".into(),
            updated_at: "u".into(),
        }
    }

    #[test]
    fn summary_counts_all_statuses() {
        let items = vec![
            record(100, Some(90), ExpenseStatus::Paid),
            record(50, None, ExpenseStatus::Draft),
            record(30, Some(30), ExpenseStatus::Paid),
        ];
        let summary = summarize_expenses(&items);
        assert_eq!(summary.total_planned, 180);
        assert_eq!(summary.total_actual, 120);
        assert_eq!(summary.by_status["paid"], 2);
        assert_eq!(summary.by_status["draft"], 1);
        assert_eq!(summary.by_status["rejected"], 0);
    }
}
