use apidoc_sync_core::spec_store::SpecStore;
use serde_json::json;
use tempfile::tempdir;

#[tokio::test]
async fn load_returns_none_before_first_save() {
    let tmp = tempdir().unwrap();
    let store = SpecStore::new(tmp.path().join("openapi.json"));

    assert_eq!(store.load_current().await.unwrap(), None);
}

#[tokio::test]
async fn saved_spec_reads_back_as_the_same_json() {
    let tmp = tempdir().unwrap();
    let store = SpecStore::new(tmp.path().join("docs/openapi.json"));
    let spec = json!({
        "openapi": "3.0.0",
        "info": { "title": "Pets", "version": "1" },
        "paths": { "/pets": { "get": { "responses": { "200": { "description": "ok" } } } } }
    });

    store.save(&spec).await.expect("save");
    let text = store.load_current().await.unwrap().expect("stored");

    assert!(text.contains("\n  \"info\""), "expected two-space pretty print, got: {text}");
    let reloaded: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(reloaded, spec);
}

#[tokio::test]
async fn save_overwrites_previous_content() {
    let tmp = tempdir().unwrap();
    let store = SpecStore::new(tmp.path().join("openapi.json"));

    store.save(&json!({"paths": {"/old": {}}})).await.unwrap();
    store.save(&json!({"paths": {}})).await.unwrap();

    let text = store.load_current().await.unwrap().unwrap();
    assert!(!text.contains("/old"));
}
