use axum::extract::{Path, Query};
use axum::Json;
use serde_json::Value;
use std::collections::HashMap;

use contracts::domain::chats::{ChatDetail, ChatItem, CreateChatBody, CreateMessageBody};

use crate::domain::chats::service;
use crate::shared::error::ApiError;

fn parse_object_id(params: &HashMap<String, String>) -> Result<i64, ApiError> {
    params
        .get("objectId")
        .and_then(|raw| raw.parse::<i64>().ok())
        .filter(|id| *id > 0)
        .ok_or_else(|| ApiError::BadRequest("objectId query param is required".to_string()))
}

fn parse_chat_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| ApiError::BadRequest("Invalid chat id".to_string()))
}

/// GET /api/chats?objectId=
pub async fn list_all(
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<ChatItem>>, ApiError> {
    let object_id = parse_object_id(&params)?;
    match service::list(object_id).await {
        Ok(items) => Ok(Json(items)),
        Err(e) => {
            tracing::error!("Failed to list chats: {}", e);
            Err(e)
        }
    }
}

/// POST /api/chats
pub async fn create(Json(body): Json<CreateChatBody>) -> Result<Json<Value>, ApiError> {
    match service::create(body).await {
        Ok(chat) => Ok(Json(chat)),
        Err(e) => {
            tracing::error!("Failed to create chat: {}", e);
            Err(e)
        }
    }
}

/// GET /api/chats/:id?objectId=
pub async fn get_by_id(
    Path(id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<ChatDetail>, ApiError> {
    let chat_id = parse_chat_id(&id)?;
    let object_id = parse_object_id(&params)?;
    match service::get_detail(chat_id, object_id).await {
        Ok(detail) => Ok(Json(detail)),
        Err(e) => {
            tracing::error!("Failed to load chat {}: {}", chat_id, e);
            Err(e)
        }
    }
}

/// POST /api/chats/:id/messages
pub async fn post_message(
    Path(id): Path<String>,
    Json(body): Json<CreateMessageBody>,
) -> Result<Json<Value>, ApiError> {
    let chat_id = parse_chat_id(&id)?;
    match service::post_message(chat_id, body).await {
        Ok(inserted) => Ok(Json(inserted)),
        Err(e) => {
            tracing::error!("Failed to post message to chat {}: {}", chat_id, e);
            Err(e)
        }
    }
}
