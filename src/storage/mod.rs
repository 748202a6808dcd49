use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::DatabaseConfig;
use crate::errors::Result;

pub mod backend;
pub mod memory;

pub use backend::SeaOrmStore;
pub use memory::MemoryStore;

/// A persisted short code mapping. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlRecord {
    pub short_code: String,
    pub original_url: String,
    pub created_at: DateTime<Utc>,
}

impl UrlRecord {
    pub fn new(short_code: impl Into<String>, original_url: impl Into<String>) -> Self {
        Self {
            short_code: short_code.into(),
            original_url: original_url.into(),
            created_at: Utc::now(),
        }
    }
}

/// Durable source of truth for short code mappings.
#[async_trait]
pub trait OriginStore: Send + Sync {
    async fn get(&self, code: &str) -> Result<Option<UrlRecord>>;

    async fn exists(&self, code: &str) -> Result<bool>;

    /// Insert-if-absent. An existing code yields `SnaplinkError::Conflict`
    /// and leaves the stored record untouched.
    async fn insert(&self, record: &UrlRecord) -> Result<()>;

    async fn count(&self) -> Result<u64>;

    /// Newest records first, at most `limit`.
    async fn load_recent(&self, limit: usize) -> Result<Vec<UrlRecord>>;

    fn backend_name(&self) -> &'static str;

    /// Release pooled connections during shutdown.
    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

pub struct StoreFactory;

impl StoreFactory {
    pub async fn create(config: &DatabaseConfig) -> Result<Arc<dyn OriginStore>> {
        let database_url = config.database_url.trim();

        if database_url.is_empty() || database_url == "memory" {
            info!("Using in-memory origin store");
            return Ok(Arc::new(MemoryStore::new()));
        }

        // 从 URL 自动推断数据库类型
        let backend_type = backend::infer_backend_from_url(database_url)?;
        let store = SeaOrmStore::new(database_url, backend_type, config).await?;
        Ok(Arc::new(store))
    }
}
