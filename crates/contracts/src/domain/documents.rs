use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Sent,
    PartiallySigned,
    Signed,
}

/// Статус рассылки из фактических счётчиков подписей.
pub fn resolve_status(recipient_count: usize, signed_count: usize) -> DocumentStatus {
    if signed_count == 0 {
        DocumentStatus::Sent
    } else if signed_count >= recipient_count {
        DocumentStatus::Signed
    } else {
        DocumentStatus::PartiallySigned
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DocumentTemplateDbRow {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub contract_type: String,
    pub html: String,
    pub css: String,
    pub storage_path: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DocumentDispatchDbRow {
    pub id: i64,
    #[serde(default)]
    pub template_id: Option<i64>,
    pub title: String,
    #[serde(default)]
    pub recipient_ids: Option<Vec<i64>>,
    #[serde(default)]
    pub recipient_phones: Option<Vec<String>>,
    #[serde(default)]
    pub recipient_count: Option<i64>,
    #[serde(default)]
    pub signed_count: Option<i64>,
    pub status: DocumentStatus,
    pub sent_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignedDocumentDbRow {
    pub id: i64,
    #[serde(default)]
    pub dispatch_id: Option<i64>,
    #[serde(default)]
    pub template_id: Option<i64>,
    pub employee_name: String,
    pub phone_number: String,
    pub signed_at: String,
    pub signed_via: String,
    #[serde(default)]
    pub file_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentTemplateRecord {
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "contractType")]
    pub contract_type: String,
    pub html: String,
    pub css: String,
    #[serde(rename = "storagePath")]
    pub storage_path: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(rename = "updatedAt")]
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentDispatchRecord {
    pub id: i64,
    #[serde(rename = "templateId")]
    pub template_id: Option<i64>,
    #[serde(rename = "templateName", skip_serializing_if = "Option::is_none")]
    pub template_name: Option<String>,
    pub title: String,
    #[serde(rename = "recipientIds")]
    pub recipient_ids: Vec<i64>,
    #[serde(rename = "recipientPhones")]
    pub recipient_phones: Vec<String>,
    #[serde(rename = "recipientCount")]
    pub recipient_count: i64,
    #[serde(rename = "signedCount")]
    pub signed_count: i64,
    pub status: DocumentStatus,
    #[serde(rename = "sentAt")]
    pub sent_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SignedDocumentRecord {
    pub id: i64,
    #[serde(rename = "dispatchId")]
    pub dispatch_id: Option<i64>,
    #[serde(rename = "templateId")]
    pub template_id: Option<i64>,
    #[serde(rename = "templateName", skip_serializing_if = "Option::is_none")]
    pub template_name: Option<String>,
    #[serde(rename = "employeeName")]
    pub employee_name: String,
    #[serde(rename = "phoneNumber")]
    pub phone_number: String,
    #[serde(rename = "signedAt")]
    pub signed_at: String,
    #[serde(rename = "signedVia")]
    pub signed_via: String,
    #[serde(rename = "fileUrl", skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentsOverview {
    pub templates: Vec<DocumentTemplateRecord>,
    pub sent: Vec<DocumentDispatchRecord>,
    pub signed: Vec<SignedDocumentRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTemplateBody {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "contractType")]
    pub contract_type: Option<String>,
    pub html: Option<String>,
    pub css: Option<String>,
    #[serde(rename = "projectData")]
    pub project_data: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateTemplateBody {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "contractType")]
    pub contract_type: Option<String>,
    pub html: Option<String>,
    pub css: Option<String>,
    #[serde(rename = "projectData")]
    pub project_data: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SendDocumentBody {
    #[serde(rename = "templateId")]
    pub template_id: Option<serde_json::Value>,
    #[serde(rename = "recipientIds")]
    pub recipient_ids: Option<Vec<serde_json::Value>>,
    pub title: Option<String>,
}

/// Сериализуемый проект шаблона, хранимый в object storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateProject {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "contractType")]
    pub contract_type: String,
    pub html: String,
    pub css: String,
    #[serde(rename = "projectData")]
    pub project_data: Option<serde_json::Value>,
    #[serde(rename = "updatedAt", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(rename = "recoveredAt", skip_serializing_if = "Option::is_none")]
    pub recovered_at: Option<String>,
}

pub fn map_template_db_row_to_record(row: DocumentTemplateDbRow) -> DocumentTemplateRecord {
    DocumentTemplateRecord {
        id: row.id,
        name: row.name,
        description: row.description.filter(|d| !d.is_empty()),
        contract_type: row.contract_type,
        html: row.html,
        css: row.css,
        storage_path: row.storage_path,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

pub fn map_dispatch_db_row_to_record(row: DocumentDispatchDbRow) -> DocumentDispatchRecord {
    DocumentDispatchRecord {
        id: row.id,
        template_id: row.template_id,
        template_name: None,
        title: row.title,
        recipient_ids: row.recipient_ids.unwrap_or_default(),
        recipient_phones: row.recipient_phones.unwrap_or_default(),
        recipient_count: row.recipient_count.unwrap_or(0),
        signed_count: row.signed_count.unwrap_or(0),
        status: row.status,
        sent_at: row.sent_at,
    }
}

pub fn map_signed_db_row_to_record(row: SignedDocumentDbRow) -> SignedDocumentRecord {
    SignedDocumentRecord {
        id: row.id,
        dispatch_id: row.dispatch_id,
        template_id: row.template_id,
        template_name: None,
        employee_name: row.employee_name,
        phone_number: row.phone_number,
        signed_at: row.signed_at,
        signed_via: row.signed_via,
        file_url: row.file_url.filter(|u| !u.is_empty()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_is_sent_without_signatures() {
        assert_eq!(resolve_status(3, 0), DocumentStatus::Sent);
    }

    #[test]
    fn status_is_partially_signed_below_recipient_count() {
        assert_eq!(resolve_status(3, 1), DocumentStatus::PartiallySigned);
    }

    #[test]
    fn status_is_signed_when_everyone_signed() {
        assert_eq!(resolve_status(3, 3), DocumentStatus::Signed);
        assert_eq!(resolve_status(2, 5), DocumentStatus::Signed);
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_string(&DocumentStatus::PartiallySigned).unwrap();
        assert_eq!(json, "\"partially_signed\"");
    }
}
