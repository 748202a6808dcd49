//! Health endpoint integration tests

mod common;

use std::sync::Arc;
use std::time::Duration;

use actix_web::http::StatusCode;
use actix_web::{App, test};
use serde_json::Value;

use snaplink::api::configure;
use snaplink::runtime::build_app_state;
use snaplink::storage::{OriginStore, UrlRecord};

use common::{CountingStore, memory_state, test_config};

#[actix_web::test]
async fn test_health_ok_with_memory_store() {
    let (state, store) = memory_state(&test_config());
    store
        .insert(&UrlRecord::new("google", "https://www.google.com"))
        .await
        .unwrap();
    let app = test::init_service(App::new().configure(configure(state))).await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["store"]["backend"], "memory");
    assert_eq!(body["store"]["records"], 1);
    assert_eq!(body["cache"]["capacity"], 128);
    assert_eq!(body["rate_limit_enabled"], true);
}

#[actix_web::test]
async fn test_health_does_not_populate_cache() {
    let (state, store) = memory_state(&test_config());
    store
        .insert(&UrlRecord::new("google", "https://www.google.com"))
        .await
        .unwrap();
    let cache = Arc::clone(&state.cache);
    let app = test::init_service(App::new().configure(configure(state))).await;

    let req = test::TestRequest::get().uri("/health").to_request();
    test::call_service(&app, req).await;
    assert!(cache.is_empty());
}

#[actix_web::test]
async fn test_health_unavailable_when_store_fails() {
    let store: Arc<dyn OriginStore> = Arc::new(CountingStore::failing(Duration::ZERO));
    let state = build_app_state(store, &test_config());
    let app = test::init_service(App::new().configure(configure(state))).await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "unhealthy");
    assert_eq!(body["store"]["backend"], "counting");
    assert!(body["store"]["error"].as_str().is_some());
}
