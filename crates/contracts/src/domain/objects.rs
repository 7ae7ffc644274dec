use serde::{Deserialize, Serialize};

/// Строка таблицы objects в короткой выборке (без created_at).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectListRow {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Полная строка objects для страницы зон.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectDbRow {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectRecord {
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateObjectBody {
    pub name: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub code: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ObjectDbInsert {
    pub name: String,
    pub description: Option<String>,
    pub address: Option<String>,
    pub code: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateZoneBody {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ZoneDbInsert {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PinUserToZoneBody {
    #[serde(rename = "userId")]
    pub user_id: Option<i64>,
    #[serde(rename = "zoneName")]
    pub zone_name: Option<String>,
}

pub fn map_object_db_row_to_record(row: ObjectDbRow) -> ObjectRecord {
    ObjectRecord {
        id: row.id,
        name: row.name,
        description: row.description.filter(|d| !d.is_empty()),
        created_at: row.created_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_description_is_dropped() {
        let record = map_object_db_row_to_record(ObjectDbRow {
            id: 1,
            name: "Корпус A".into(),
            description: Some(String::new()),
            created_at: "2025-01-01T00:00:00Z".into(),
        });
        assert!(record.description.is_none());
    }
}
