//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

use snaplink::api::AppState;
use snaplink::config::{LimitConfig, StaticConfig};
use snaplink::errors::{Result, SnaplinkError};
use snaplink::runtime::build_app_state;
use snaplink::storage::{MemoryStore, OriginStore, UrlRecord};

/// Config with generous limits so only tests that target admission hit 429.
pub fn test_config() -> StaticConfig {
    let mut config = StaticConfig::default();
    config.cache.capacity = 128;
    config.cache.shards = 4;
    config.rate_limit.redirect.per_client = Some(LimitConfig::new(10_000, 60_000));
    config.rate_limit.redirect.per_code = Some(LimitConfig::new(10_000, 60_000));
    config.rate_limit.create.per_client = Some(LimitConfig::new(10_000, 60_000));
    config
}

pub fn memory_state(config: &StaticConfig) -> (AppState, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let state = build_app_state(Arc::clone(&store) as Arc<dyn OriginStore>, config);
    (state, store)
}

/// Wraps a store, counting `get` calls and optionally delaying or failing them.
pub struct CountingStore {
    inner: MemoryStore,
    pub gets: AtomicU32,
    delay: Duration,
    fail: bool,
}

impl CountingStore {
    pub fn new(delay: Duration) -> Self {
        Self {
            inner: MemoryStore::new(),
            gets: AtomicU32::new(0),
            delay,
            fail: false,
        }
    }

    pub fn failing(delay: Duration) -> Self {
        Self {
            fail: true,
            ..Self::new(delay)
        }
    }

    pub fn gets(&self) -> u32 {
        self.gets.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OriginStore for CountingStore {
    async fn get(&self, code: &str) -> Result<Option<UrlRecord>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        if self.fail {
            return Err(SnaplinkError::origin_unavailable("store offline"));
        }
        self.inner.get(code).await
    }

    async fn exists(&self, code: &str) -> Result<bool> {
        if self.fail {
            return Err(SnaplinkError::origin_unavailable("store offline"));
        }
        self.inner.exists(code).await
    }

    async fn insert(&self, record: &UrlRecord) -> Result<()> {
        if self.fail {
            return Err(SnaplinkError::origin_unavailable("store offline"));
        }
        self.inner.insert(record).await
    }

    async fn count(&self) -> Result<u64> {
        if self.fail {
            return Err(SnaplinkError::origin_unavailable("store offline"));
        }
        self.inner.count().await
    }

    async fn load_recent(&self, limit: usize) -> Result<Vec<UrlRecord>> {
        self.inner.load_recent(limit).await
    }

    fn backend_name(&self) -> &'static str {
        "counting"
    }
}

/// Reads the inner store, then holds the answer until `release` is called,
/// so a test can act between an origin read and its publication.
pub struct GatedStore {
    pub inner: MemoryStore,
    gate: Notify,
}

impl GatedStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryStore::new(),
            gate: Notify::new(),
        }
    }

    pub fn release(&self) {
        self.gate.notify_one();
    }
}

#[async_trait]
impl OriginStore for GatedStore {
    async fn get(&self, code: &str) -> Result<Option<UrlRecord>> {
        let found = self.inner.get(code).await;
        self.gate.notified().await;
        found
    }

    async fn exists(&self, code: &str) -> Result<bool> {
        self.inner.exists(code).await
    }

    async fn insert(&self, record: &UrlRecord) -> Result<()> {
        self.inner.insert(record).await
    }

    async fn count(&self) -> Result<u64> {
        self.inner.count().await
    }

    async fn load_recent(&self, limit: usize) -> Result<Vec<UrlRecord>> {
        self.inner.load_recent(limit).await
    }

    fn backend_name(&self) -> &'static str {
        "gated"
    }
}
