use axum::http::HeaderMap;
use axum::Json;
use serde_json::Value;

use crate::domain::telegram::service::{self, TgUpdate};
use crate::shared::error::ApiError;

/// POST /api/telegram/webhook — входящие обновления Bot API.
pub async fn webhook(
    headers: HeaderMap,
    Json(update): Json<TgUpdate>,
) -> Result<Json<Value>, ApiError> {
    let secret_header = headers
        .get("x-telegram-bot-api-secret-token")
        .and_then(|v| v.to_str().ok());

    if !service::verify_secret(secret_header) {
        return Err(ApiError::Unauthorized("Invalid webhook secret".to_string()));
    }

    match service::handle_update(update).await {
        Ok(ack) => Ok(Json(ack)),
        Err(e) => {
            tracing::error!("Failed to process Telegram update: {}", e);
            Err(e)
        }
    }
}
