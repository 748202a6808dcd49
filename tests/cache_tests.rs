//! Resolution cache capacity and eviction

mod common;

use std::sync::Arc;
use std::time::Duration;

use snaplink::cache::{ResolutionCache, ShardedLru};
use snaplink::config::CacheConfig;
use snaplink::storage::{MemoryStore, OriginStore, UrlRecord};

use common::GatedStore;

fn single_shard(capacity: usize) -> CacheConfig {
    CacheConfig {
        capacity,
        shards: 1,
        ..CacheConfig::default()
    }
}

#[test]
fn test_single_shard_evicts_least_recently_used() {
    let lru = ShardedLru::new(3, 1);
    lru.put("aaaaaa", Arc::from("https://a.example"));
    lru.put("bbbbbb", Arc::from("https://b.example"));
    lru.put("cccccc", Arc::from("https://c.example"));

    // 访问 a 使 b 成为最久未使用
    assert!(lru.get("aaaaaa").is_some());
    let evicted = lru.put("dddddd", Arc::from("https://d.example"));

    assert_eq!(evicted.as_deref(), Some("bbbbbb"));
    assert!(lru.peek("bbbbbb").is_none());
    assert!(lru.peek("aaaaaa").is_some());
    assert_eq!(lru.len(), 3);
}

#[test]
fn test_sharded_never_exceeds_capacity() {
    let lru = ShardedLru::new(100, 8);
    for i in 0..10_000 {
        lru.put(&format!("k{i:05}"), Arc::from("https://example.com"));
        assert!(lru.len() <= 100);
    }
    assert_eq!(lru.capacity(), 100);
    assert_eq!(lru.shard_count(), 8);
}

#[tokio::test]
async fn test_evicted_entry_reloads_from_origin() {
    let store: Arc<dyn OriginStore> = Arc::new(MemoryStore::new());
    for code in ["code01", "code02", "code03"] {
        store
            .insert(&UrlRecord::new(code, format!("https://example.com/{code}")))
            .await
            .unwrap();
    }
    let cache = ResolutionCache::new(&single_shard(2));

    for code in ["code01", "code02", "code03"] {
        cache.get_or_load(code, &store).await.unwrap();
    }
    assert_eq!(cache.len(), 2);
    assert!(cache.get("code01").is_none());

    let url = cache.get_or_load("code01", &store).await.unwrap().unwrap();
    assert_eq!(&*url, "https://example.com/code01");
    assert_eq!(cache.stats().origin_loads, 4);
}

#[tokio::test]
async fn test_warm_keeps_newest_records() {
    let cache = ResolutionCache::new(&single_shard(2));
    // load_recent 返回从新到旧
    let records = vec![
        UrlRecord::new("newest", "https://example.com/3"),
        UrlRecord::new("middle", "https://example.com/2"),
        UrlRecord::new("oldest", "https://example.com/1"),
    ];

    assert_eq!(cache.warm(&records), 2);
    assert!(cache.get("newest").is_some());
    assert!(cache.get("middle").is_some());
    assert!(cache.get("oldest").is_none());
}

#[tokio::test]
async fn test_put_clears_negative_entry() {
    let store: Arc<dyn OriginStore> = Arc::new(MemoryStore::new());
    let cache = ResolutionCache::new(&CacheConfig::default());

    assert!(cache.get_or_load("absent", &store).await.unwrap().is_none());
    cache.put("absent", "https://example.com/now").await;

    let url = cache.get_or_load("absent", &store).await.unwrap().unwrap();
    assert_eq!(&*url, "https://example.com/now");
}

/// Fill the single shard with other codes so `code` is evicted from the LRU.
async fn evict(cache: &ResolutionCache, code: &str, capacity: usize) {
    for i in 0..capacity {
        cache.put(&format!("fill{:02}", i), "https://filler.example").await;
    }
    assert!(cache.get(code).is_none());
}

#[tokio::test]
async fn test_create_during_absent_read_is_not_shadowed() {
    let gated = Arc::new(GatedStore::new());
    let store: Arc<dyn OriginStore> = gated.clone();
    let cache = Arc::new(ResolutionCache::new(&single_shard(2)));

    // 读取在记录写入前完成，但结果在写入后才发布
    let lookup = {
        let cache = Arc::clone(&cache);
        let store = Arc::clone(&store);
        tokio::spawn(async move { cache.get_or_load("racy01", &store).await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;

    gated
        .insert(&UrlRecord::new("racy01", "https://example.com/racy"))
        .await
        .unwrap();
    cache.put("racy01", "https://example.com/racy").await;
    gated.release();

    assert!(lookup.await.unwrap().unwrap().is_none());

    evict(&cache, "racy01", 2).await;
    gated.release();
    let url = cache.get_or_load("racy01", &store).await.unwrap().unwrap();
    assert_eq!(&*url, "https://example.com/racy");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_create_and_lookup_always_converge() {
    let store: Arc<dyn OriginStore> = Arc::new(MemoryStore::new());
    let cache = Arc::new(ResolutionCache::new(&single_shard(2)));

    for i in 0..200 {
        let code = format!("race{:03}", i);
        let url = format!("https://example.com/{code}");

        let lookup = {
            let (cache, store, code) = (Arc::clone(&cache), Arc::clone(&store), code.clone());
            tokio::spawn(async move { cache.get_or_load(&code, &store).await })
        };
        let create = {
            let (cache, store) = (Arc::clone(&cache), Arc::clone(&store));
            let (code, url) = (code.clone(), url.clone());
            tokio::spawn(async move {
                store.insert(&UrlRecord::new(code.as_str(), url.as_str())).await.unwrap();
                cache.put(&code, &url).await;
            })
        };
        lookup.await.unwrap().unwrap();
        create.await.unwrap();

        evict(&cache, &code, 2).await;
        let resolved = cache.get_or_load(&code, &store).await.unwrap();
        assert_eq!(resolved.as_deref(), Some(url.as_str()), "code {code}");
    }
}
