use once_cell::sync::OnceCell;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shared::config::{self, SupabaseConfig};
use crate::shared::error::ApiError;

/// Коды ошибок Postgres, которые API транслирует в свои статусы.
pub const CODE_UNIQUE_VIOLATION: &str = "23505";
pub const CODE_MISSING_TABLE: &str = "42P01";

#[derive(Debug, Error)]
pub enum PostgrestError {
    #[error("data store request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{}", .message.as_deref().unwrap_or("data store request failed"))]
    Upstream {
        status: u16,
        code: Option<String>,
        message: Option<String>,
    },
}

impl PostgrestError {
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, PostgrestError::Upstream { code: Some(c), .. } if c == CODE_UNIQUE_VIOLATION)
    }

    pub fn is_missing_table(&self) -> bool {
        matches!(self, PostgrestError::Upstream { code: Some(c), .. } if c == CODE_MISSING_TABLE)
    }

    pub fn upstream_message(&self) -> Option<&str> {
        match self {
            PostgrestError::Upstream { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

/// Тело ошибки PostgREST: `{"code": "...", "message": "..."}`.
#[derive(Debug, Deserialize)]
struct UpstreamErrorBody {
    code: Option<String>,
    message: Option<String>,
}

/// HTTP-клиент таблиц Postgres-over-REST (Supabase).
pub struct PostgrestClient {
    http: reqwest::Client,
    base_url: String,
    service_role_key: String,
}

fn normalize_url(value: &str) -> String {
    value.trim_end_matches('/').to_string()
}

impl PostgrestClient {
    pub fn from_config(config: &SupabaseConfig) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("Failed to create HTTP client"),
            base_url: normalize_url(&config.url),
            service_role_key: config.service_role_key.clone(),
        }
    }

    fn request(&self, method: Method, table: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/rest/v1/{}", self.base_url, table);
        self.http
            .request(method, url)
            .header("apikey", &self.service_role_key)
            .bearer_auth(&self.service_role_key)
    }

    async fn read_rows<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<Vec<T>, PostgrestError> {
        let status = response.status();
        if !status.is_success() {
            return Err(upstream_error(status, response.text().await.unwrap_or_default()));
        }
        Ok(response.json().await?)
    }

    pub async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>, PostgrestError> {
        let response = self.request(Method::GET, table).query(query).send().await?;
        self.read_rows(response).await
    }

    /// POST с `Prefer: return=representation` — хранилище возвращает
    /// созданные строки.
    pub async fn insert_returning<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        table: &str,
        body: &B,
    ) -> Result<Vec<T>, PostgrestError> {
        let response = self
            .request(Method::POST, table)
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await?;
        self.read_rows(response).await
    }

    pub async fn insert<B: Serialize + ?Sized>(
        &self,
        table: &str,
        body: &B,
    ) -> Result<(), PostgrestError> {
        let response = self.request(Method::POST, table).json(body).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(upstream_error(status, response.text().await.unwrap_or_default()));
        }
        Ok(())
    }

    pub async fn patch_returning<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        table: &str,
        query: &[(&str, String)],
        body: &B,
    ) -> Result<Vec<T>, PostgrestError> {
        let response = self
            .request(Method::PATCH, table)
            .header("Prefer", "return=representation")
            .query(query)
            .json(body)
            .send()
            .await?;
        self.read_rows(response).await
    }

    pub async fn patch<B: Serialize + ?Sized>(
        &self,
        table: &str,
        query: &[(&str, String)],
        body: &B,
    ) -> Result<(), PostgrestError> {
        let response = self
            .request(Method::PATCH, table)
            .query(query)
            .json(body)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(upstream_error(status, response.text().await.unwrap_or_default()));
        }
        Ok(())
    }

    pub async fn delete_returning<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>, PostgrestError> {
        let response = self
            .request(Method::DELETE, table)
            .header("Prefer", "return=representation")
            .query(query)
            .send()
            .await?;
        self.read_rows(response).await
    }

    pub async fn delete(
        &self,
        table: &str,
        query: &[(&str, String)],
    ) -> Result<(), PostgrestError> {
        let response = self
            .request(Method::DELETE, table)
            .header("Prefer", "return=minimal")
            .query(query)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(upstream_error(status, response.text().await.unwrap_or_default()));
        }
        Ok(())
    }
}

fn upstream_error(status: StatusCode, body: String) -> PostgrestError {
    tracing::error!("PostgREST request failed with status {}: {}", status, body);
    let parsed: Option<UpstreamErrorBody> = serde_json::from_str(&body).ok();
    match parsed {
        Some(parsed) => PostgrestError::Upstream {
            status: status.as_u16(),
            code: parsed.code,
            message: parsed.message,
        },
        None => PostgrestError::Upstream {
            status: status.as_u16(),
            code: None,
            message: if body.is_empty() { None } else { Some(body) },
        },
    }
}

/// Фильтр равенства: `eq.<value>`.
pub fn eq<T: std::fmt::Display>(value: T) -> String {
    format!("eq.{}", value)
}

/// Фильтр вхождения: `in.(1,2,3)`.
pub fn in_list(values: &[i64]) -> String {
    let joined = values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(",");
    format!("in.({})", joined)
}

static CLIENT: OnceCell<PostgrestClient> = OnceCell::new();

/// Глобальный клиент хранилища. Ошибка конфигурации поднимается лениво,
/// при первом обращении, как и в остальном API.
pub fn client() -> Result<&'static PostgrestClient, ApiError> {
    let supabase = &config::get().supabase;
    if supabase.url.is_empty() {
        return Err(ApiError::Internal("SUPABASE_URL is not configured.".into()));
    }
    if supabase.service_role_key.is_empty() {
        return Err(ApiError::Internal(
            "SUPABASE_SERVICE_ROLE_KEY is not configured.".into(),
        ));
    }
    Ok(CLIENT.get_or_init(|| PostgrestClient::from_config(supabase)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_filter_encoding() {
        assert_eq!(in_list(&[1, 2, 3]), "in.(1,2,3)");
        assert_eq!(in_list(&[42]), "in.(42)");
    }

    #[test]
    fn eq_filter_encoding() {
        assert_eq!(eq(17), "eq.17");
        assert_eq!(eq("Корпус A"), "eq.Корпус A");
    }

    #[test]
    fn upstream_error_parses_vendor_code() {
        let err = upstream_error(
            StatusCode::CONFLICT,
            r#"{"code":"23505","message":"duplicate key"}"#.into(),
        );
        assert!(err.is_unique_violation());
        assert_eq!(err.upstream_message(), Some("duplicate key"));
    }

    #[test]
    fn upstream_error_keeps_raw_body_without_json() {
        let err = upstream_error(StatusCode::BAD_GATEWAY, "gateway exploded".into());
        assert_eq!(err.upstream_message(), Some("gateway exploded"));
        assert!(!err.is_missing_table());
    }

    #[test]
    fn url_normalization_strips_trailing_slash() {
        assert_eq!(normalize_url("https://x.supabase.co/"), "https://x.supabase.co");
        assert_eq!(normalize_url("https://x.supabase.co"), "https://x.supabase.co");
    }
}
