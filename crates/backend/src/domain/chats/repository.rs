use serde::{Deserialize, Serialize};
use serde_json::json;

use contracts::domain::chats::{ChatRow, MessageRow};

use crate::shared::data::postgrest::{self, eq};
use crate::shared::error::ApiError;

const CHATS: &str = "chats";
const MESSAGES: &str = "chat_messages";
const MEMBERS: &str = "chat_members";

/// Выборка чатов с превью последнего сообщения через встроенный ресурс.
const CHAT_LIST_SELECT: &str = "id,title,is_group,updated_at,chat_messages!left(content,created_at)";

#[derive(Debug, Clone, Deserialize)]
pub struct ChatIdRow {
    pub id: i64,
}

/// Чат, найденный по Telegram-идентификатору.
#[derive(Debug, Clone, Deserialize)]
pub struct TelegramChatRow {
    pub id: i64,
    #[serde(default)]
    pub tg_chat_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatDbInsert {
    pub title: String,
    pub is_group: bool,
    pub object_id: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageDbInsert {
    pub chat_id: i64,
    pub author_id: String,
    pub content: String,
    pub object_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

pub async fn list_for_object(object_id: i64) -> Result<Vec<ChatRow>, ApiError> {
    let client = postgrest::client()?;
    Ok(client
        .select(
            CHATS,
            &[
                ("select", CHAT_LIST_SELECT.to_string()),
                ("object_id", eq(object_id)),
                ("order", "updated_at.desc".to_string()),
                ("limit", "50".to_string()),
            ],
        )
        .await?)
}

pub async fn get_by_id_and_object(
    id: i64,
    object_id: i64,
) -> Result<Option<ChatRow>, ApiError> {
    let client = postgrest::client()?;
    let rows: Vec<ChatRow> = client
        .select(
            CHATS,
            &[
                ("select", CHAT_LIST_SELECT.to_string()),
                ("id", eq(id)),
                ("object_id", eq(object_id)),
                ("limit", "1".to_string()),
            ],
        )
        .await?;
    Ok(rows.into_iter().next())
}

pub async fn messages_for_chat(
    chat_id: i64,
    object_id: i64,
) -> Result<Vec<MessageRow>, ApiError> {
    let client = postgrest::client()?;
    Ok(client
        .select(
            MESSAGES,
            &[
                ("select", "id,author_id,content,created_at".to_string()),
                ("chat_id", eq(chat_id)),
                ("object_id", eq(object_id)),
                ("order", "id.desc".to_string()),
                ("limit", "100".to_string()),
            ],
        )
        .await?)
}

pub async fn insert_chat(row: &ChatDbInsert) -> Result<Vec<ChatIdRow>, ApiError> {
    let client = postgrest::client()?;
    Ok(client.insert_returning(CHATS, row).await?)
}

pub async fn insert_members(
    chat_id: i64,
    member_ids: &[String],
    object_id: i64,
) -> Result<(), ApiError> {
    let client = postgrest::client()?;
    let rows: Vec<_> = member_ids
        .iter()
        .map(|user_id| {
            json!({
                "chat_id": chat_id,
                "user_id": user_id,
                "object_id": object_id,
            })
        })
        .collect();
    client.insert(MEMBERS, &rows).await?;
    Ok(())
}

pub async fn insert_message(row: &MessageDbInsert) -> Result<Vec<ChatIdRow>, ApiError> {
    let client = postgrest::client()?;
    Ok(client.insert_returning(MESSAGES, row).await?)
}

pub async fn find_by_tg_chat_id(tg_chat_id: i64) -> Result<Option<TelegramChatRow>, ApiError> {
    let client = postgrest::client()?;
    let rows: Vec<TelegramChatRow> = client
        .select(
            CHATS,
            &[
                ("select", "id,tg_chat_id".to_string()),
                ("tg_chat_id", eq(tg_chat_id)),
                ("limit", "1".to_string()),
            ],
        )
        .await?;
    Ok(rows.into_iter().next())
}

/// Новый чат для входящего Telegram-диалога, ещё не известного системе.
pub async fn insert_telegram_chat(
    title: &str,
    is_group: bool,
    tg_chat_id: i64,
    tg_type: &str,
    object_id: i64,
) -> Result<Vec<ChatIdRow>, ApiError> {
    let client = postgrest::client()?;
    Ok(client
        .insert_returning(
            CHATS,
            &json!({
                "title": title,
                "is_group": is_group,
                "tg_chat_id": tg_chat_id,
                "tg_type": tg_type,
                "object_id": object_id,
            }),
        )
        .await?)
}

/// tg_chat_id чата — нужен для ретрансляции исходящих сообщений в Telegram.
pub async fn telegram_chat_id(chat_id: i64) -> Result<Option<i64>, ApiError> {
    let client = postgrest::client()?;
    let rows: Vec<TelegramChatRow> = client
        .select(
            CHATS,
            &[
                ("select", "id,tg_chat_id".to_string()),
                ("id", eq(chat_id)),
                ("limit", "1".to_string()),
            ],
        )
        .await?;
    Ok(rows.into_iter().next().and_then(|row| row.tg_chat_id))
}
