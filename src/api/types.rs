use serde::{Deserialize, Serialize};

use crate::cache::CacheStats;
use crate::storage::UrlRecord;

/// Body of `POST /api/url/create`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUrlBody {
    #[serde(default)]
    pub short_code: Option<String>,
    pub original_url: String,
}

/// Success body of `POST /api/url/create`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUrlResponse {
    pub short_code: String,
    pub original_url: String,
    pub created_at: String,
}

impl From<UrlRecord> for CreateUrlResponse {
    fn from(record: UrlRecord) -> Self {
        Self {
            short_code: record.short_code,
            original_url: record.original_url,
            created_at: record.created_at.to_rfc3339(),
        }
    }
}

/// Body of every JSON error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub error: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthStoreCheck {
    pub status: &'static str,
    pub backend: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub records: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub uptime_secs: i64,
    pub store: HealthStoreCheck,
    pub cache: CacheStats,
    pub rate_limit_enabled: bool,
    pub response_time_ms: u64,
}
