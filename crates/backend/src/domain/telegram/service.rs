use serde::Deserialize;
use serde_json::{json, Value};

use crate::domain::chats::repository::{self, MessageDbInsert};
use crate::shared::config;
use crate::shared::error::ApiError;

// ============================================================================
// Входящие обновления Bot API
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct TgUser {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TgChat {
    pub id: i64,
    #[serde(rename = "type")]
    pub chat_type: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TgMessage {
    pub message_id: i64,
    #[serde(default)]
    pub from: Option<TgUser>,
    pub chat: TgChat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TgUpdate {
    #[serde(default)]
    pub message: Option<TgMessage>,
}

/// Секрет вебхука: при пустой настройке проверка выключена.
pub fn verify_secret(header_value: Option<&str>) -> bool {
    let secret = config::get().telegram.webhook_secret.as_str();
    if secret.is_empty() {
        return true;
    }
    header_value == Some(secret)
}

fn default_object_id() -> Result<i64, ApiError> {
    let id = config::get().telegram.default_object_id;
    if id <= 0 {
        return Err(ApiError::Internal(
            "Set TELEGRAM_DEFAULT_OBJECT_ID env to valid object id".to_string(),
        ));
    }
    Ok(id)
}

/// Подпись чата для входящего сообщения: title -> username -> first_name.
fn chat_title(chat: &TgChat) -> String {
    chat.title
        .clone()
        .or_else(|| chat.username.clone())
        .or_else(|| chat.first_name.clone())
        .unwrap_or_else(|| "Telegram chat".to_string())
}

/// Входящее обновление: чат заводится по tg_chat_id при первом сообщении,
/// текст записывается как входящее сообщение. Обновления без текста
/// подтверждаются и игнорируются.
pub async fn handle_update(update: TgUpdate) -> Result<Value, ApiError> {
    let message = match update.message {
        Some(message) => message,
        None => return Ok(json!({ "ok": true })),
    };

    let text = match message.text.as_deref() {
        Some(text) if !text.is_empty() => text,
        _ => return Ok(json!({ "ok": true })),
    };

    let object_id = default_object_id()?;
    let chat = &message.chat;

    let chat_id = match repository::find_by_tg_chat_id(chat.id).await? {
        Some(existing) => existing.id,
        None => {
            let rows = repository::insert_telegram_chat(
                &chat_title(chat),
                chat.chat_type != "private",
                chat.id,
                &chat.chat_type,
                object_id,
            )
            .await?;
            rows.into_iter().next().map(|row| row.id).ok_or_else(|| {
                ApiError::Internal("Failed to upsert chat for Telegram".to_string())
            })?
        }
    };

    let author_id = message
        .from
        .as_ref()
        .map(|from| from.id.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    repository::insert_message(&MessageDbInsert {
        chat_id,
        author_id,
        content: text.to_string(),
        object_id,
        external_id: Some(message.message_id),
        direction: Some("in".to_string()),
        status: Some("delivered".to_string()),
    })
    .await?;

    Ok(json!({ "ok": true }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chat(title: Option<&str>, username: Option<&str>, first_name: Option<&str>) -> TgChat {
        TgChat {
            id: 100,
            chat_type: "private".to_string(),
            title: title.map(str::to_string),
            first_name: first_name.map(str::to_string),
            username: username.map(str::to_string),
        }
    }

    #[test]
    fn chat_title_fallback_chain() {
        assert_eq!(chat_title(&chat(Some("Смена"), Some("u"), Some("f"))), "Смена");
        assert_eq!(chat_title(&chat(None, Some("usm_nodir"), Some("f"))), "usm_nodir");
        assert_eq!(chat_title(&chat(None, None, Some("Нодир"))), "Нодир");
        assert_eq!(chat_title(&chat(None, None, None)), "Telegram chat");
    }

    #[test]
    fn update_without_message_deserializes() {
        let update: TgUpdate = serde_json::from_str(r#"{"update_id": 5}"#).unwrap();
        assert!(update.message.is_none());
    }

    #[test]
    fn group_detection_uses_chat_type() {
        let group: TgChat = serde_json::from_str(
            r#"{"id": -100500, "type": "supergroup", "title": "Объект A"}"#,
        )
        .unwrap();
        assert_ne!(group.chat_type, "private");
    }
}
