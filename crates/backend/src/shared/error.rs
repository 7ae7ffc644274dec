use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::shared::data::postgrest::PostgrestError;
use crate::shared::data::storage::StorageError;

/// Ошибки уровня API. Тело ответа повторяет форму
/// `{statusCode, statusMessage}`, которую ожидает дашборд.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Internal(String),

    #[error("{0}")]
    BadGateway(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({
            "statusCode": status.as_u16(),
            "statusMessage": self.to_string(),
        }));
        (status, body).into_response()
    }
}

/// Общее правило трансляции ошибок хранилища: нарушение уникальности -> 409,
/// отсутствие таблицы -> 500, иначе сообщение апстрима как 400.
/// Места с особыми текстами (создание клиента, документы) делают свой match
/// до этого fallback.
impl From<PostgrestError> for ApiError {
    fn from(err: PostgrestError) -> Self {
        if err.is_unique_violation() {
            return ApiError::Conflict(err.to_string());
        }
        if err.is_missing_table() {
            return ApiError::Internal(err.to_string());
        }
        match err {
            PostgrestError::Upstream { message: Some(message), .. } => {
                ApiError::BadRequest(message)
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_violation_maps_to_conflict() {
        let err = PostgrestError::Upstream {
            status: 409,
            code: Some("23505".into()),
            message: Some("duplicate key value violates unique constraint".into()),
        };
        let api: ApiError = err.into();
        assert_eq!(api.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn upstream_message_becomes_bad_request() {
        let err = PostgrestError::Upstream {
            status: 422,
            code: Some("22P02".into()),
            message: Some("invalid input syntax".into()),
        };
        let api: ApiError = err.into();
        assert_eq!(api.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(api.to_string(), "invalid input syntax");
    }
}
