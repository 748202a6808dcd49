//! Concurrent cache misses share a single origin read

mod common;

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;

use snaplink::cache::ResolutionCache;
use snaplink::config::{CacheConfig, StaticConfig};
use snaplink::errors::SnaplinkError;
use snaplink::runtime::build_app_state;
use snaplink::storage::{OriginStore, UrlRecord};

use common::{CountingStore, test_config};

fn cache() -> Arc<ResolutionCache> {
    Arc::new(ResolutionCache::new(&CacheConfig::default()))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_misses_read_origin_once() {
    let counting = Arc::new(CountingStore::new(Duration::from_millis(50)));
    counting
        .insert(&UrlRecord::new("google", "https://www.google.com"))
        .await
        .unwrap();
    let store: Arc<dyn OriginStore> = counting.clone();
    let cache = cache();

    let tasks = (0..32).map(|_| {
        let cache = Arc::clone(&cache);
        let store = Arc::clone(&store);
        tokio::spawn(async move { cache.get_or_load("google", &store).await })
    });
    let results = join_all(tasks).await;

    for result in results {
        let url = result.unwrap().unwrap().unwrap();
        assert_eq!(&*url, "https://www.google.com");
    }
    assert_eq!(counting.gets(), 1);
    assert_eq!(cache.stats().origin_loads, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_absent_lookups_read_origin_once() {
    let counting = Arc::new(CountingStore::new(Duration::from_millis(50)));
    let store: Arc<dyn OriginStore> = counting.clone();
    let cache = cache();

    let results = join_all((0..16).map(|_| cache.get_or_load("missing", &store))).await;
    assert!(results.iter().all(|r| matches!(r, Ok(None))));
    assert_eq!(counting.gets(), 1);

    // 负缓存命中，不再访问存储
    assert!(cache.get_or_load("missing", &store).await.unwrap().is_none());
    assert_eq!(counting.gets(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_origin_failure_reaches_every_waiter_and_is_not_cached() {
    let counting = Arc::new(CountingStore::failing(Duration::from_millis(50)));
    let store: Arc<dyn OriginStore> = counting.clone();
    let cache = cache();

    let results = join_all((0..8).map(|_| cache.get_or_load("google", &store))).await;
    for result in &results {
        assert!(matches!(result, Err(SnaplinkError::OriginUnavailable(_))));
    }
    assert_eq!(counting.gets(), 1);

    // A later request retries the origin instead of replaying the failure.
    let _ = cache.get_or_load("google", &store).await;
    assert_eq!(counting.gets(), 2);
    assert!(cache.is_empty());
}

#[tokio::test]
async fn test_cancelled_leader_does_not_strand_followers() {
    let counting = Arc::new(CountingStore::new(Duration::from_millis(100)));
    counting
        .insert(&UrlRecord::new("google", "https://www.google.com"))
        .await
        .unwrap();
    let store: Arc<dyn OriginStore> = counting.clone();
    let cache = cache();

    let leader = {
        let cache = Arc::clone(&cache);
        let store = Arc::clone(&store);
        tokio::spawn(async move { cache.get_or_load("google", &store).await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;
    leader.abort();

    let url = cache.get_or_load("google", &store).await.unwrap().unwrap();
    assert_eq!(&*url, "https://www.google.com");
    assert_eq!(counting.gets(), 1);
}

#[actix_web::test]
async fn test_http_redirects_during_outage_return_503() {
    use actix_web::http::StatusCode;
    use actix_web::{App, test};

    let store: Arc<dyn OriginStore> = Arc::new(CountingStore::failing(Duration::ZERO));
    let config: StaticConfig = test_config();
    let state = build_app_state(store, &config);
    let app = test::init_service(App::new().configure(snaplink::api::configure(state))).await;

    let req = test::TestRequest::get().uri("/api/url/google").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
}
