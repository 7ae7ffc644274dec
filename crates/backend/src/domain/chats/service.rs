use serde_json::{json, Value};

use contracts::domain::chats::{
    map_chat_row_to_item, map_message_row_to_item, ChatDetail, ChatItem, CreateChatBody,
    CreateMessageBody,
};

use super::repository::{self, ChatDbInsert, MessageDbInsert};
use crate::domain::telegram;
use crate::shared::error::ApiError;

pub async fn list(object_id: i64) -> Result<Vec<ChatItem>, ApiError> {
    let rows = repository::list_for_object(object_id).await?;
    Ok(rows.into_iter().map(map_chat_row_to_item).collect())
}

pub async fn get_detail(id: i64, object_id: i64) -> Result<ChatDetail, ApiError> {
    let chat = repository::get_by_id_and_object(id, object_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Chat not found".to_string()))?;

    let mut messages = repository::messages_for_chat(id, object_id).await?;
    // Хранилище отдаёт последние 100 по убыванию id; наружу — в хронологии.
    messages.reverse();

    Ok(ChatDetail {
        id: chat.id,
        title: chat.title,
        is_group: chat.is_group,
        updated_at: chat.updated_at,
        messages: messages.into_iter().map(map_message_row_to_item).collect(),
    })
}

pub async fn create(body: CreateChatBody) -> Result<Value, ApiError> {
    let title = body
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::BadRequest("title is required".to_string()))?;

    let object_id = body
        .object_id
        .filter(|id| *id > 0)
        .ok_or_else(|| ApiError::BadRequest("objectId is required".to_string()))?;

    let rows = repository::insert_chat(&ChatDbInsert {
        title: title.to_string(),
        is_group: body.is_group.unwrap_or(true),
        object_id,
    })
    .await?;

    let chat = rows
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::Internal("Failed to create chat".to_string()))?;

    if let Some(member_ids) = body.member_ids.as_deref() {
        if !member_ids.is_empty() {
            repository::insert_members(chat.id, member_ids, object_id).await?;
        }
    }

    Ok(json!({ "id": chat.id }))
}

pub async fn post_message(chat_id: i64, body: CreateMessageBody) -> Result<Value, ApiError> {
    let author_id = body
        .author_id
        .as_deref()
        .map(str::trim)
        .filter(|a| !a.is_empty());
    let content = body
        .content
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());

    let (author_id, content) = match (author_id, content) {
        (Some(author_id), Some(content)) => (author_id, content),
        _ => {
            return Err(ApiError::BadRequest(
                "authorId and content are required".to_string(),
            ));
        }
    };

    let object_id = body
        .object_id
        .filter(|id| *id > 0)
        .ok_or_else(|| ApiError::BadRequest("objectId is required".to_string()))?;

    let rows = repository::insert_message(&MessageDbInsert {
        chat_id,
        author_id: author_id.to_string(),
        content: content.to_string(),
        object_id,
        external_id: None,
        direction: Some("out".to_string()),
        status: Some("sent".to_string()),
    })
    .await?;

    let inserted = rows
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::Internal("Failed to insert message".to_string()))?;

    // Чат, привязанный к Telegram, получает копию сообщения в мессенджер.
    // Сбой ретрансляции не роняет запрос: сообщение уже сохранено.
    match repository::telegram_chat_id(chat_id).await {
        Ok(Some(tg_chat_id)) => {
            if let Err(e) = telegram::client::send_message(tg_chat_id, content).await {
                tracing::error!("Failed to relay message to Telegram: {}", e);
            }
        }
        Ok(None) => {}
        Err(e) => {
            tracing::error!("Failed to resolve tg_chat_id for chat {}: {}", chat_id, e);
        }
    }

    Ok(json!({ "id": inserted.id }))
}
