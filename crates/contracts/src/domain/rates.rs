use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Отфильтрованный ответ прокси валютных курсов.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatesResponse {
    pub base: String,
    /// Unix-время последнего обновления апстрима в миллисекундах.
    #[serde(rename = "updatedAt")]
    pub updated_at: i64,
    pub rates: BTreeMap<String, f64>,
}
