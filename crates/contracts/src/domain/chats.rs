use serde::{Deserialize, Serialize};

/// Превью последнего сообщения из встроенной выборки PostgREST.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatMessagePreviewRow {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatRow {
    pub id: i64,
    pub title: String,
    pub is_group: bool,
    pub updated_at: String,
    #[serde(default)]
    pub chat_messages: Vec<ChatMessagePreviewRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatItem {
    pub id: i64,
    pub title: String,
    #[serde(rename = "isGroup")]
    pub is_group: bool,
    #[serde(rename = "updatedAt")]
    pub updated_at: String,
    #[serde(rename = "lastMessage", skip_serializing_if = "Option::is_none")]
    pub last_message: Option<String>,
    #[serde(rename = "lastTime", skip_serializing_if = "Option::is_none")]
    pub last_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unread: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageRow {
    pub id: i64,
    pub author_id: String,
    pub content: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageItem {
    pub id: i64,
    #[serde(rename = "authorId")]
    pub author_id: String,
    pub text: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatDetail {
    pub id: i64,
    pub title: String,
    #[serde(rename = "isGroup")]
    pub is_group: bool,
    #[serde(rename = "updatedAt")]
    pub updated_at: String,
    pub messages: Vec<MessageItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateChatBody {
    pub title: Option<String>,
    #[serde(rename = "isGroup")]
    pub is_group: Option<bool>,
    #[serde(rename = "memberIds")]
    pub member_ids: Option<Vec<String>>,
    #[serde(rename = "objectId")]
    pub object_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateMessageBody {
    #[serde(rename = "authorId")]
    pub author_id: Option<String>,
    pub content: Option<String>,
    #[serde(rename = "objectId")]
    pub object_id: Option<i64>,
}

pub fn map_chat_row_to_item(row: ChatRow) -> ChatItem {
    let preview = row.chat_messages.into_iter().next();
    let (last_message, last_time) = match preview {
        Some(p) => (p.content.filter(|c| !c.is_empty()), p.created_at),
        None => (None, None),
    };
    ChatItem {
        id: row.id,
        title: row.title,
        is_group: row.is_group,
        updated_at: row.updated_at,
        last_message,
        last_time,
        unread: None,
    }
}

pub fn map_message_row_to_item(row: MessageRow) -> MessageItem {
    MessageItem {
        id: row.id,
        author_id: row.author_id,
        text: row.content,
        created_at: row.created_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_without_messages_has_no_preview() {
        let item = map_chat_row_to_item(ChatRow {
            id: 1,
            title: "Дежурная смена".into(),
            is_group: true,
            updated_at: "2025-01-01T00:00:00Z".into(),
            chat_messages: vec![],
        });
        assert!(item.last_message.is_none());
        assert!(item.last_time.is_none());
    }

    #[test]
    fn chat_preview_takes_first_message() {
        let item = map_chat_row_to_item(ChatRow {
            id: 1,
            title: "t".into(),
            is_group: false,
            updated_at: "u".into(),
            chat_messages: vec![ChatMessagePreviewRow {
                content: Some("привет".into()),
                created_at: Some("2025-01-02T00:00:00Z".into()),
            }],
        });
        assert_eq!(item.last_message.as_deref(), Some("привет"));
    }
}
