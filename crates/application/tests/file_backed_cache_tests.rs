mod common;

use std::sync::Arc;

use application::TagListCache;
use chrono::Duration;
use common::{CountingGateway, device, type_map};
use domain::CatalogueStore;
use infrastructure::FileCatalogueStore;

fn gateway() -> Arc<CountingGateway> {
    Arc::new(CountingGateway::new(type_map(&[
        ("TEMP", "REAL"),
        ("PRESSURE", "REAL"),
    ])))
}

#[tokio::test]
async fn test_restart_reuses_fresh_cache_file() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileCatalogueStore::new(dir.path()));

    let first_gateway = gateway();
    let first = TagListCache::new(first_gateway.clone(), store.clone(), Duration::minutes(5));
    first.get_catalogue(&device("D1")).await.unwrap();
    assert_eq!(first_gateway.list_calls(), 1);
    assert!(dir.path().join("D1.json").exists());

    // A second process over the same directory
    let second_gateway = gateway();
    let second = TagListCache::new(second_gateway.clone(), store, Duration::minutes(5));
    let catalogue = second.get_catalogue(&device("D1")).await.unwrap();

    assert_eq!(second_gateway.list_calls(), 0);
    assert_eq!(catalogue.type_of("TEMP"), Some("REAL"));
}

#[tokio::test]
async fn test_corrupt_cache_file_is_replaced_from_device() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("D1.json"), "not json at all").unwrap();
    let store = Arc::new(FileCatalogueStore::new(dir.path()));
    let gateway = gateway();

    let cache = TagListCache::new(gateway.clone(), store.clone(), Duration::minutes(5));
    let catalogue = cache.get_catalogue(&device("D1")).await.unwrap();

    assert_eq!(gateway.list_calls(), 1);
    assert_eq!(catalogue.len(), 2);
    assert_eq!(store.load("D1").await.unwrap(), Some(catalogue.entries.clone()));
}

#[tokio::test]
async fn test_startup_reset_forces_a_device_fetch() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileCatalogueStore::new(dir.path()));
    let gateway = gateway();

    let cache = TagListCache::new(gateway.clone(), store.clone(), Duration::minutes(5));
    cache.get_catalogue(&device("D1")).await.unwrap();

    assert_eq!(store.reset().await.unwrap(), 1);

    let restarted = TagListCache::new(gateway.clone(), store, Duration::minutes(5));
    restarted.get_catalogue(&device("D1")).await.unwrap();
    assert_eq!(gateway.list_calls(), 2);
}
