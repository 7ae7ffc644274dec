use once_cell::sync::Lazy;
use serde_json::{json, Value};

use crate::shared::config;
use crate::shared::error::ApiError;

static HTTP: Lazy<reqwest::Client> = Lazy::new(|| {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .build()
        .expect("Failed to create HTTP client")
});

fn bot_token() -> Result<&'static str, ApiError> {
    let token = config::get().telegram.bot_token.as_str();
    if token.is_empty() {
        return Err(ApiError::Internal("Missing TELEGRAM_BOT_TOKEN env".to_string()));
    }
    Ok(token)
}

/// Исходящее текстовое сообщение через Bot API.
pub async fn send_message(tg_chat_id: i64, text: &str) -> Result<Value, ApiError> {
    let token = bot_token()?;
    let url = format!("https://api.telegram.org/bot{}/sendMessage", token);

    let response = HTTP
        .post(url)
        .json(&json!({
            "chat_id": tg_chat_id,
            "text": text,
        }))
        .send()
        .await
        .map_err(|e| ApiError::BadGateway(format!("Telegram API request failed: {}", e)))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        tracing::error!("Telegram sendMessage failed with status {}: {}", status, body);
        return Err(ApiError::BadGateway(format!(
            "Telegram API request failed with status {}",
            status
        )));
    }

    response
        .json()
        .await
        .map_err(|e| ApiError::BadGateway(format!("Telegram API request failed: {}", e)))
}
