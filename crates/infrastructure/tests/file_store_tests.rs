use domain::{CatalogueStore, DomainError, TagCatalogueEntry, TagTypeMap};
use infrastructure::cache::cache_file_name;
use infrastructure::config::load_device_registry;
use infrastructure::{DeviceConfigFile, FileCatalogueStore};

fn entries() -> TagTypeMap {
    let mut map = TagTypeMap::new();
    map.insert("TAG1".into(), TagCatalogueEntry::new("DINT"));
    map.insert("TAG2".into(), TagCatalogueEntry::new("REAL"));
    map
}

#[tokio::test]
async fn test_save_then_load_returns_same_entries() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileCatalogueStore::new(dir.path());

    let written_at = store.save("D1", &entries()).await.unwrap();
    let loaded = store.load("D1").await.unwrap().expect("record should exist");

    assert_eq!(loaded, entries());
    assert_eq!(store.modified_at("D1").await.unwrap(), Some(written_at));
}

#[tokio::test]
async fn test_cache_file_uses_type_map_format() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileCatalogueStore::new(dir.path());
    store.save("D1", &entries()).await.unwrap();

    let raw = std::fs::read_to_string(dir.path().join("D1.json")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(
        json,
        serde_json::json!({ "TAG1": { "type": "DINT" }, "TAG2": { "type": "REAL" } })
    );
}

#[tokio::test]
async fn test_save_leaves_no_temp_file() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileCatalogueStore::new(dir.path());
    store.save("D1", &entries()).await.unwrap();

    let names: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["D1.json".to_string()]);
}

#[tokio::test]
async fn test_save_replaces_whole_record() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileCatalogueStore::new(dir.path());
    store.save("D1", &entries()).await.unwrap();

    let mut smaller = TagTypeMap::new();
    smaller.insert("ONLY".into(), TagCatalogueEntry::new("BOOL"));
    store.save("D1", &smaller).await.unwrap();

    assert_eq!(store.load("D1").await.unwrap(), Some(smaller));
}

#[tokio::test]
async fn test_missing_record_is_none() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileCatalogueStore::new(dir.path());

    assert_eq!(store.modified_at("D1").await.unwrap(), None);
    assert_eq!(store.load("D1").await.unwrap(), None);
}

#[tokio::test]
async fn test_malformed_record_is_storage_error() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("D1.json"), "{ not json").unwrap();
    let store = FileCatalogueStore::new(dir.path());

    let err = store.load("D1").await.unwrap_err();
    assert!(matches!(err, DomainError::Storage(_)));
}

#[tokio::test]
async fn test_unsafe_device_id_is_sanitised() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileCatalogueStore::new(dir.path());

    store.save("Line 1/PLC:A", &entries()).await.unwrap();

    assert_eq!(cache_file_name("Line 1/PLC:A"), "Line_1_PLC_A.json");
    assert!(dir.path().join("Line_1_PLC_A.json").exists());
    assert_eq!(store.load("Line 1/PLC:A").await.unwrap(), Some(entries()));
}

#[tokio::test]
async fn test_reset_removes_files_and_keeps_subdirectories() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileCatalogueStore::new(dir.path());
    store.save("D1", &entries()).await.unwrap();
    store.save("D2", &entries()).await.unwrap();
    std::fs::create_dir(dir.path().join("keep")).unwrap();

    let removed = store.reset().await.unwrap();

    assert_eq!(removed, 2);
    assert_eq!(store.load("D1").await.unwrap(), None);
    assert!(dir.path().join("keep").is_dir());
}

#[tokio::test]
async fn test_reset_creates_missing_directory() {
    let dir = tempfile::tempdir().unwrap();
    let cache_dir = dir.path().join("nested").join("cache");
    let store = FileCatalogueStore::new(&cache_dir);

    assert_eq!(store.reset().await.unwrap(), 0);
    assert!(cache_dir.is_dir());
}

#[tokio::test]
async fn test_device_ids_sharing_a_cache_file_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plc_config.json");
    tokio::fs::write(
        &path,
        r#"{ "plc_list": [
            { "id": "line/1", "ip": "10.0.0.1" },
            { "id": "line:1", "ip": "10.0.0.2" }
        ] }"#,
    )
    .await
    .unwrap();

    let err = load_device_registry(&path).await.unwrap_err();
    assert!(matches!(err, DomainError::Config(_)));
    assert!(err.to_string().contains("line_1.json"));
}

#[tokio::test]
async fn test_device_ids_with_distinct_cache_files_load() {
    let registry = DeviceConfigFile::from_json(
        r#"{ "plc_list": [
            { "id": "line/1", "ip": "10.0.0.1" },
            { "id": "line/2", "ip": "10.0.0.2" }
        ] }"#,
    )
    .unwrap()
    .into_registry()
    .unwrap();

    assert_eq!(registry.device_count(), 2);
    assert_ne!(cache_file_name("line/1"), cache_file_name("line/2"));
}
