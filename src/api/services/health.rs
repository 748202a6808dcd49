use std::time::{Duration, Instant};

use actix_web::{HttpResponse, web};
use tracing::{error, trace};

use crate::api::state::AppState;
use crate::api::types::{HealthResponse, HealthStoreCheck};

const STORE_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// Health Service
///
/// Counts records in the origin store (never loads them) and reports the
/// resolution cache counters. 503 when the store check fails.
pub struct HealthService;

impl HealthService {
    pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
        let start = Instant::now();
        let backend = state.store.backend_name();

        let store = match tokio::time::timeout(STORE_CHECK_TIMEOUT, state.store.count()).await {
            Ok(Ok(records)) => {
                trace!("Store health check passed, {} records", records);
                HealthStoreCheck {
                    status: "healthy",
                    backend,
                    records: Some(records),
                    error: None,
                }
            }
            Ok(Err(e)) => {
                error!("Store health check failed: {}", e);
                HealthStoreCheck {
                    status: "unhealthy",
                    backend,
                    records: None,
                    error: Some(e.message().to_string()),
                }
            }
            Err(_) => {
                error!("Store health check timed out");
                HealthStoreCheck {
                    status: "unhealthy",
                    backend,
                    records: None,
                    error: Some("timeout".to_string()),
                }
            }
        };

        let healthy = store.error.is_none();
        let now = chrono::Utc::now();
        let body = HealthResponse {
            status: if healthy { "healthy" } else { "unhealthy" },
            timestamp: now.to_rfc3339(),
            uptime_secs: (now - state.started_at).num_seconds().max(0),
            store,
            cache: state.cache.stats(),
            rate_limit_enabled: state.admission.is_enabled(),
            response_time_ms: start.elapsed().as_millis() as u64,
        };

        if healthy {
            HttpResponse::Ok().json(body)
        } else {
            HttpResponse::ServiceUnavailable().json(body)
        }
    }
}
