use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::admission::AdmissionController;
use crate::cache::ResolutionCache;
use crate::services::{CreateHandler, RedirectResolver};
use crate::storage::OriginStore;
use crate::utils::TrustedProxies;

/// Shared handles the HTTP handlers work with. Cheap to clone per worker.
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<RedirectResolver>,
    pub creator: Arc<CreateHandler>,
    pub store: Arc<dyn OriginStore>,
    pub cache: Arc<ResolutionCache>,
    pub admission: Arc<AdmissionController>,
    pub proxies: Arc<TrustedProxies>,
    pub started_at: DateTime<Utc>,
}
