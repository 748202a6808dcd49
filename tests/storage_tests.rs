//! Origin store backends

use std::sync::Arc;

use snaplink::config::DatabaseConfig;
use snaplink::errors::SnaplinkError;
use snaplink::storage::{MemoryStore, OriginStore, SeaOrmStore, StoreFactory, UrlRecord};

// ===== Shared contract =====

async fn exercise_store(store: &dyn OriginStore) {
    assert_eq!(store.count().await.unwrap(), 0);
    assert!(store.get("google").await.unwrap().is_none());
    assert!(!store.exists("google").await.unwrap());

    let record = UrlRecord::new("google", "https://www.google.com");
    store.insert(&record).await.unwrap();

    let loaded = store.get("google").await.unwrap().unwrap();
    assert_eq!(loaded.short_code, "google");
    assert_eq!(loaded.original_url, "https://www.google.com");
    assert!(store.exists("google").await.unwrap());

    let dup = UrlRecord::new("google", "https://other.example");
    let err = store.insert(&dup).await.unwrap_err();
    assert!(matches!(err, SnaplinkError::Conflict(_)), "got {err:?}");
    assert_eq!(
        store.get("google").await.unwrap().unwrap().original_url,
        "https://www.google.com"
    );

    store
        .insert(&UrlRecord::new("second", "https://example.com/2"))
        .await
        .unwrap();
    assert_eq!(store.count().await.unwrap(), 2);
    assert_eq!(store.load_recent(1).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_memory_store_contract() {
    let store = MemoryStore::new();
    exercise_store(&store).await;
}

#[tokio::test]
async fn test_sqlite_store_contract() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("links.db");
    let url = format!("sqlite://{}", path.display());

    let store = SeaOrmStore::new(&url, "sqlite", &DatabaseConfig::default())
        .await
        .unwrap();
    exercise_store(&store).await;
    store.close().await.unwrap();
}

#[tokio::test]
async fn test_sqlite_store_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("persist.db").display());
    let config = DatabaseConfig::default();

    {
        let store = SeaOrmStore::new(&url, "sqlite", &config).await.unwrap();
        store
            .insert(&UrlRecord::new("keepme", "https://example.com/keep"))
            .await
            .unwrap();
        store.close().await.unwrap();
    }

    let store = SeaOrmStore::new(&url, "sqlite", &config).await.unwrap();
    let record = store.get("keepme").await.unwrap().unwrap();
    assert_eq!(record.original_url, "https://example.com/keep");
}

#[tokio::test]
async fn test_factory_picks_backend_from_url() {
    let memory = StoreFactory::create(&DatabaseConfig::default()).await.unwrap();
    assert_eq!(memory.backend_name(), "memory");

    let dir = tempfile::tempdir().unwrap();
    let config = DatabaseConfig {
        database_url: dir.path().join("factory.db").display().to_string(),
        ..DatabaseConfig::default()
    };
    let sqlite: Arc<dyn OriginStore> = StoreFactory::create(&config).await.unwrap();
    assert_eq!(sqlite.backend_name(), "sqlite");

    let bad = DatabaseConfig {
        database_url: "redis://localhost".to_string(),
        ..DatabaseConfig::default()
    };
    assert!(matches!(
        StoreFactory::create(&bad).await,
        Err(SnaplinkError::DatabaseConfig(_))
    ));
}
