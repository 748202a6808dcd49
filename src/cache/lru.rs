use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Instant;

use ::lru::LruCache;
use parking_lot::Mutex;
use xxhash_rust::xxh64::xxh64;

/// A cached mapping owned by the resolution cache.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub value: Arc<str>,
    pub last_access: Instant,
    pub size_hint: usize,
}

impl CacheEntry {
    fn new(key: &str, value: Arc<str>) -> Self {
        Self {
            size_hint: key.len() + value.len(),
            value,
            last_access: Instant::now(),
        }
    }
}

/// Bounded LRU split into independently locked shards.
///
/// Shard capacities sum to exactly the configured capacity, so the cache as a
/// whole can never exceed it. Recency is exact within a shard; a single shard
/// gives exact global LRU order.
pub struct ShardedLru {
    shards: Box<[Mutex<LruCache<String, CacheEntry>>]>,
    capacity: usize,
}

impl ShardedLru {
    pub fn new(capacity: usize, shards: usize) -> Self {
        let capacity = capacity.max(1);
        let shard_count = shards.clamp(1, capacity);
        let base = capacity / shard_count;
        let extra = capacity % shard_count;

        let shards = (0..shard_count)
            .map(|i| {
                let cap = base + usize::from(i < extra);
                Mutex::new(LruCache::new(
                    NonZeroUsize::new(cap).unwrap_or(NonZeroUsize::MIN),
                ))
            })
            .collect();

        Self { shards, capacity }
    }

    #[inline]
    fn shard(&self, key: &str) -> &Mutex<LruCache<String, CacheEntry>> {
        let idx = (xxh64(key.as_bytes(), 0) % self.shards.len() as u64) as usize;
        &self.shards[idx]
    }

    /// Look up and promote to most recently used.
    pub fn get(&self, key: &str) -> Option<Arc<str>> {
        let mut shard = self.shard(key).lock();
        shard.get_mut(key).map(|entry| {
            entry.last_access = Instant::now();
            Arc::clone(&entry.value)
        })
    }

    /// Look up without touching recency.
    pub fn peek(&self, key: &str) -> Option<Arc<str>> {
        self.shard(key)
            .lock()
            .peek(key)
            .map(|entry| Arc::clone(&entry.value))
    }

    /// Insert or refresh `key`. Returns the key evicted to make room, if any.
    pub fn put(&self, key: &str, value: Arc<str>) -> Option<String> {
        let entry = CacheEntry::new(key, value);
        let mut shard = self.shard(key).lock();
        match shard.push(key.to_string(), entry) {
            Some((old_key, _)) if old_key != key => Some(old_key),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.shards.iter().map(|s| s.lock().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Approximate bytes held by keys and values.
    pub fn size_hint(&self) -> usize {
        self.shards
            .iter()
            .map(|s| s.lock().iter().map(|(_, e)| e.size_hint).sum::<usize>())
            .sum()
    }
}
