use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info, trace, warn};

use super::lru::ShardedLru;
use super::negative::NegativeCache;
use super::single_flight::{FlightOutcome, Join, SingleFlight};
use crate::config::CacheConfig;
use crate::errors::Result;
use crate::storage::{OriginStore, UrlRecord};

#[derive(Default)]
struct CacheCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    negative_hits: AtomicU64,
    origin_loads: AtomicU64,
    coalesced: AtomicU64,
}

/// Point-in-time view of the resolution cache counters.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub capacity: usize,
    pub shards: usize,
    pub approx_bytes: usize,
    pub hits: u64,
    pub misses: u64,
    pub negative_hits: u64,
    pub origin_loads: u64,
    pub coalesced: u64,
}

/// In-memory shortCode → originalUrl view in front of the origin store.
///
/// Lookups that miss go through a single-flight group, so concurrent callers
/// for the same absent key share one origin read. Codes the origin reported
/// absent are remembered briefly in a negative cache.
pub struct ResolutionCache {
    lru: Arc<ShardedLru>,
    negative: NegativeCache,
    flights: Arc<SingleFlight>,
    counters: Arc<CacheCounters>,
}

impl ResolutionCache {
    pub fn new(config: &CacheConfig) -> Self {
        let lru = ShardedLru::new(config.capacity, config.shards);
        info!(
            "Resolution cache: capacity={}, shards={}, negative_ttl={}s",
            lru.capacity(),
            lru.shard_count(),
            config.negative_ttl_secs
        );
        Self {
            lru: Arc::new(lru),
            negative: NegativeCache::new(config.negative_capacity, config.negative_ttl_secs),
            flights: Arc::new(SingleFlight::new()),
            counters: Arc::new(CacheCounters::default()),
        }
    }

    /// Cache-only lookup. Never touches the origin store.
    pub fn get(&self, code: &str) -> Option<Arc<str>> {
        let found = self.lru.get(code);
        let counter = if found.is_some() {
            &self.counters.hits
        } else {
            &self.counters.misses
        };
        counter.fetch_add(1, Ordering::Relaxed);
        found
    }

    /// Insert a mapping known to exist in the origin store.
    ///
    /// The LRU is written before the negative mark is cleared; a concurrent
    /// absent read re-checks the LRU after marking, so one side always
    /// clears the mark.
    pub async fn put(&self, code: &str, original_url: &str) {
        if let Some(evicted) = self.lru.put(code, Arc::from(original_url)) {
            trace!("Evicted {} to make room for {}", evicted, code);
        }
        self.negative.remove(code).await;
    }

    /// Resolve through the cache, reading the origin store at most once per
    /// concurrent burst of misses for the same code.
    pub async fn get_or_load(
        &self,
        code: &str,
        store: &Arc<dyn OriginStore>,
    ) -> Result<Option<Arc<str>>> {
        if let Some(url) = self.lru.get(code) {
            self.counters.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(Some(url));
        }
        if self.negative.contains(code) {
            self.counters.negative_hits.fetch_add(1, Ordering::Relaxed);
            return Ok(None);
        }

        let joined = self.flights.join(code, || self.lru.get(code));
        match joined {
            Join::Ready(url) => {
                self.counters.hits.fetch_add(1, Ordering::Relaxed);
                Ok(Some(url))
            }
            Join::Follower(rx) => {
                self.counters.coalesced.fetch_add(1, Ordering::Relaxed);
                trace!("Joining in-flight origin read for {}", code);
                SingleFlight::wait(rx).await
            }
            Join::Leader(tx, rx) => {
                self.counters.misses.fetch_add(1, Ordering::Relaxed);
                self.counters.origin_loads.fetch_add(1, Ordering::Relaxed);
                debug!("Cache miss for {}, reading origin store", code);
                self.spawn_load(code.to_string(), Arc::clone(store), tx);
                SingleFlight::wait(rx).await
            }
        }
    }

    /// The read runs detached from the caller, so a dropped request cannot
    /// leave followers waiting on a flight nobody drives.
    fn spawn_load(
        &self,
        code: String,
        store: Arc<dyn OriginStore>,
        tx: watch::Sender<Option<FlightOutcome>>,
    ) {
        let lru = Arc::clone(&self.lru);
        let negative = self.negative.clone();
        let flights = Arc::clone(&self.flights);

        tokio::spawn(async move {
            let outcome = match store.get(&code).await {
                Ok(Some(record)) => {
                    let url: Arc<str> = Arc::from(record.original_url);
                    lru.put(&code, Arc::clone(&url));
                    Ok(Some(url))
                }
                Ok(None) => {
                    // Mark first, then look for a create that landed meanwhile.
                    negative.mark(&code).await;
                    if lru.peek(&code).is_some() {
                        negative.remove(&code).await;
                    }
                    Ok(None)
                }
                Err(e) => {
                    warn!("Origin read for {} failed: {}", code, e);
                    Err(e)
                }
            };
            // Cache is populated before the flight is retired.
            flights.finish(&code);
            let _ = tx.send(Some(outcome));
        });
    }

    /// Preload records, newest first, without exceeding capacity.
    pub fn warm(&self, records: &[UrlRecord]) -> usize {
        let take = records.len().min(self.lru.capacity());
        // 按从旧到新插入，使最新记录处于最近使用端
        for record in records[..take].iter().rev() {
            self.lru.put(&record.short_code, Arc::from(record.original_url.as_str()));
        }
        take
    }

    pub fn len(&self) -> usize {
        self.lru.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lru.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.lru.capacity()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.lru.len(),
            capacity: self.lru.capacity(),
            shards: self.lru.shard_count(),
            approx_bytes: self.lru.size_hint(),
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            negative_hits: self.counters.negative_hits.load(Ordering::Relaxed),
            origin_loads: self.counters.origin_loads.load(Ordering::Relaxed),
            coalesced: self.counters.coalesced.load(Ordering::Relaxed),
        }
    }
}
