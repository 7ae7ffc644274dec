use axum::Json;

use contracts::domain::rates::RatesResponse;

use crate::domain::rates::service;
use crate::shared::error::ApiError;

/// GET /api/rates/latest
pub async fn latest() -> Result<Json<RatesResponse>, ApiError> {
    match service::latest().await {
        Ok(rates) => Ok(Json(rates)),
        Err(e) => {
            tracing::error!("Failed to fetch currency rates: {}", e);
            Err(e)
        }
    }
}
