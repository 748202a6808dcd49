use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::admission::AdmissionController;
use crate::api::AppState;
use crate::cache::ResolutionCache;
use crate::config::StaticConfig;
use crate::services::{CodeGenerator, CreateHandler, RedirectResolver};
use crate::storage::{OriginStore, StoreFactory};
use crate::utils::TrustedProxies;

pub struct StartupContext {
    pub state: AppState,
    /// Admission janitor; aborted on shutdown.
    pub janitor: Option<JoinHandle<()>>,
}

/// Wire the services around an already-open store.
pub fn build_app_state(store: Arc<dyn OriginStore>, config: &StaticConfig) -> AppState {
    let cache = Arc::new(ResolutionCache::new(&config.cache));
    let admission = Arc::new(AdmissionController::from_config(&config.rate_limit));
    let generator = CodeGenerator::from_config(&config.codegen);

    let resolver = Arc::new(RedirectResolver::new(
        Arc::clone(&admission),
        Arc::clone(&cache),
        Arc::clone(&store),
    ));
    let creator = Arc::new(CreateHandler::new(
        Arc::clone(&admission),
        Arc::clone(&cache),
        Arc::clone(&store),
        generator,
    ));

    AppState {
        resolver,
        creator,
        store,
        cache,
        admission,
        proxies: Arc::new(TrustedProxies::new(&config.server.trusted_proxies)),
        started_at: chrono::Utc::now(),
    }
}

/// Preload the newest records into the cache. Failures are logged, not fatal.
pub async fn warm_cache(state: &AppState) -> usize {
    match state.store.load_recent(state.cache.capacity()).await {
        Ok(records) => {
            let loaded = state.cache.warm(&records);
            info!("Cache warmed with {} records", loaded);
            loaded
        }
        Err(e) => {
            warn!("Cache warm-up skipped: {}", e);
            0
        }
    }
}

/// 准备服务器启动的上下文：存储、缓存、限流
pub async fn prepare_server_startup(config: &StaticConfig) -> Result<StartupContext> {
    let start_time = Instant::now();
    debug!("Starting pre-startup processing...");

    let store = StoreFactory::create(&config.database)
        .await
        .context("Failed to create origin store")?;
    info!("Using origin store backend: {}", store.backend_name());

    let state = build_app_state(store, config);

    if config.cache.warm_on_startup {
        warm_cache(&state).await;
    }

    let janitor = if state.admission.is_enabled() {
        let every = Duration::from_millis(config.rate_limit.janitor_interval_ms.max(1));
        Some(state.admission.spawn_janitor(every))
    } else {
        warn!("Rate limiting is disabled");
        None
    };

    debug!(
        "Pre-startup processing completed in {} ms",
        start_time.elapsed().as_millis()
    );

    Ok(StartupContext { state, janitor })
}
