use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use contracts::domain::rates::RatesResponse;

use crate::shared::error::ApiError;

const UPSTREAM_URL: &str = "https://open.er-api.com/v6/latest/USD";

/// 12 часов, чтобы не выбирать лимиты бесплатного тарифа апстрима.
const CACHE_TTL: Duration = Duration::from_secs(60 * 60 * 12);

/// Наружу уходит только используемый дашбордом набор валют.
const PICK: [&str; 4] = ["USD", "EUR", "RUB", "UZS"];

#[derive(Debug, Deserialize)]
struct UpstreamRates {
    base_code: String,
    time_last_update_unix: i64,
    #[serde(default)]
    rates: HashMap<String, f64>,
}

struct CachedRates {
    fetched_at: Instant,
    payload: RatesResponse,
}

static CACHE: Lazy<RwLock<Option<CachedRates>>> = Lazy::new(|| RwLock::new(None));

static HTTP: Lazy<reqwest::Client> = Lazy::new(|| {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .build()
        .expect("Failed to create HTTP client")
});

fn filter_rates(rates: &HashMap<String, f64>) -> BTreeMap<String, f64> {
    let mut filtered = BTreeMap::new();
    for key in PICK {
        if let Some(rate) = rates.get(key) {
            filtered.insert(key.to_string(), *rate);
        }
    }
    filtered
}

async fn fetch_upstream() -> Result<RatesResponse, ApiError> {
    let response = HTTP
        .get(UPSTREAM_URL)
        .send()
        .await
        .map_err(|e| {
            tracing::error!("Rates upstream request failed: {}", e);
            ApiError::BadGateway("Failed to fetch currency rates".to_string())
        })?;

    if !response.status().is_success() {
        tracing::error!("Rates upstream returned status {}", response.status());
        return Err(ApiError::BadGateway("Failed to fetch currency rates".to_string()));
    }

    let upstream: UpstreamRates = response.json().await.map_err(|e| {
        tracing::error!("Rates upstream returned malformed body: {}", e);
        ApiError::BadGateway("Failed to fetch currency rates".to_string())
    })?;

    if upstream.rates.is_empty() {
        return Err(ApiError::BadGateway("Failed to fetch currency rates".to_string()));
    }

    Ok(RatesResponse {
        base: upstream.base_code,
        updated_at: upstream.time_last_update_unix * 1000,
        rates: filter_rates(&upstream.rates),
    })
}

/// Курс с мемоизацией на процесс: повторные запросы в пределах TTL
/// не ходят в апстрим.
pub async fn latest() -> Result<RatesResponse, ApiError> {
    {
        let cache = CACHE.read().await;
        if let Some(cached) = cache.as_ref() {
            if cached.fetched_at.elapsed() < CACHE_TTL {
                return Ok(cached.payload.clone());
            }
        }
    }

    let payload = fetch_upstream().await?;

    let mut cache = CACHE.write().await;
    *cache = Some(CachedRates {
        fetched_at: Instant::now(),
        payload: payload.clone(),
    });

    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_picked_currencies_survive() {
        let mut rates = HashMap::new();
        rates.insert("USD".to_string(), 1.0);
        rates.insert("UZS".to_string(), 12650.0);
        rates.insert("JPY".to_string(), 147.2);
        rates.insert("EUR".to_string(), 0.91);

        let filtered = filter_rates(&rates);
        assert_eq!(filtered.len(), 3);
        assert!(filtered.contains_key("UZS"));
        assert!(!filtered.contains_key("JPY"));
        // RUB отсутствует в апстриме — просто не попадает в ответ.
        assert!(!filtered.contains_key("RUB"));
    }

    #[test]
    fn upstream_body_parses() {
        let body = r#"{
            "base_code": "USD",
            "time_last_update_unix": 1754438401,
            "rates": { "USD": 1.0, "UZS": 12650.55 }
        }"#;
        let upstream: UpstreamRates = serde_json::from_str(body).unwrap();
        assert_eq!(upstream.base_code, "USD");
        assert_eq!(upstream.time_last_update_unix, 1_754_438_401);
    }
}
