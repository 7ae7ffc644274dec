use once_cell::sync::OnceCell;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

use crate::shared::config::{self, SupabaseConfig};
use crate::shared::error::ApiError;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{}", .message.as_deref().unwrap_or("storage request failed"))]
    Upstream {
        status: u16,
        message: Option<String>,
    },
}

#[derive(Debug, Deserialize)]
struct UpstreamErrorBody {
    message: Option<String>,
}

/// Клиент object storage (бакеты + объекты по пути).
pub struct StorageClient {
    http: reqwest::Client,
    base_url: String,
    service_role_key: String,
}

impl StorageClient {
    pub fn from_config(config: &SupabaseConfig) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("Failed to create HTTP client"),
            base_url: config.url.trim_end_matches('/').to_string(),
            service_role_key: config.service_role_key.clone(),
        }
    }

    fn auth(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .header("apikey", &self.service_role_key)
            .bearer_auth(&self.service_role_key)
    }

    /// Создание бакета идемпотентно: конфликт "уже существует"
    /// (400/409 либо текст "already exists") не считается ошибкой.
    pub async fn ensure_bucket(&self, bucket: &str, public: bool) -> Result<(), StorageError> {
        let url = format!("{}/storage/v1/bucket", self.base_url);
        let response = self
            .auth(self.http.post(url))
            .json(&json!({
                "id": bucket,
                "name": bucket,
                "public": public,
            }))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() || status.as_u16() == 400 || status.as_u16() == 409 {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        let parsed: Option<UpstreamErrorBody> = serde_json::from_str(&body).ok();
        let message = parsed.and_then(|p| p.message);
        if message
            .as_deref()
            .map(|m| m.to_lowercase().contains("already exists"))
            .unwrap_or(false)
        {
            return Ok(());
        }

        tracing::error!("Failed to ensure storage bucket {}: {}", bucket, body);
        Err(StorageError::Upstream {
            status: status.as_u16(),
            message,
        })
    }

    pub async fn upload_object(
        &self,
        bucket: &str,
        path: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let url = format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url,
            bucket,
            encode_storage_path(path)
        );
        let response = self
            .auth(self.http.post(url))
            .header("Content-Type", content_type)
            .header("x-upsert", "true")
            .body(data)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Failed to upload object {}/{}: {}", bucket, path, body);
            let parsed: Option<UpstreamErrorBody> = serde_json::from_str(&body).ok();
            return Err(StorageError::Upstream {
                status: status.as_u16(),
                message: parsed.and_then(|p| p.message),
            });
        }
        Ok(())
    }

    pub async fn download_object(&self, bucket: &str, path: &str) -> Result<String, StorageError> {
        let url = format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url,
            bucket,
            encode_storage_path(path)
        );
        let response = self.auth(self.http.get(url)).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let parsed: Option<UpstreamErrorBody> = serde_json::from_str(&body).ok();
            return Err(StorageError::Upstream {
                status: status.as_u16(),
                message: parsed.and_then(|p| p.message),
            });
        }
        Ok(response.text().await?)
    }

    pub fn public_object_url(&self, bucket: &str, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url,
            bucket,
            encode_storage_path(path)
        )
    }
}

impl StorageError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::Upstream { status: 404, .. })
    }
}

/// Каждый сегмент пути кодируется отдельно, разделители сохраняются.
pub fn encode_storage_path(path: &str) -> String {
    path.split('/')
        .map(|part| urlencoding::encode(part).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

static CLIENT: OnceCell<StorageClient> = OnceCell::new();

pub fn client() -> Result<&'static StorageClient, ApiError> {
    let supabase = &config::get().supabase;
    if supabase.url.is_empty() {
        return Err(ApiError::Internal("SUPABASE_URL is not configured.".into()));
    }
    if supabase.service_role_key.is_empty() {
        return Err(ApiError::Internal(
            "SUPABASE_SERVICE_ROLE_KEY is not configured.".into(),
        ));
    }
    Ok(CLIENT.get_or_init(|| StorageClient::from_config(supabase)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_segments_are_encoded_separately() {
        assert_eq!(
            encode_storage_path("john/avatars/фото 1.png"),
            "john/avatars/%D1%84%D0%BE%D1%82%D0%BE%201.png"
        );
        assert_eq!(encode_storage_path("plain/path.pdf"), "plain/path.pdf");
    }

    #[test]
    fn not_found_detection() {
        let err = StorageError::Upstream {
            status: 404,
            message: None,
        };
        assert!(err.is_not_found());
    }
}
