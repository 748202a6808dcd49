use std::time::Duration;

use moka::future::Cache;
use tracing::trace;

/// Short-lived memory of codes the origin store reported absent.
#[derive(Clone)]
pub struct NegativeCache {
    inner: Cache<String, ()>,
}

impl NegativeCache {
    pub fn new(max_capacity: u64, ttl_secs: u64) -> Self {
        let inner = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        trace!(
            "NegativeCache initialized: max_capacity={}, ttl={}s",
            max_capacity, ttl_secs
        );

        Self { inner }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.inner.contains_key(key)
    }

    pub async fn mark(&self, key: &str) {
        trace!("Marking code as absent: {}", key);
        self.inner.insert(key.to_string(), ()).await;
    }

    pub async fn remove(&self, key: &str) {
        self.inner.invalidate(key).await;
    }

    #[cfg(test)]
    pub async fn sync(&self) {
        self.inner.run_pending_tasks().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mark_and_remove() {
        let cache = NegativeCache::new(100, 60);
        assert!(!cache.contains("nothere"));

        cache.mark("nothere").await;
        assert!(cache.contains("nothere"));
        assert!(!cache.contains("other1"));

        cache.remove("nothere").await;
        assert!(!cache.contains("nothere"));
    }

    #[tokio::test]
    async fn test_marks_expire() {
        let cache = NegativeCache::new(100, 1);
        cache.mark("expiring").await;
        assert!(cache.contains("expiring"));

        tokio::time::sleep(Duration::from_millis(1100)).await;
        cache.sync().await;

        assert!(!cache.contains("expiring"));
    }
}
