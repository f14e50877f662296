//! Persistence tests
//!
//! Snapshot round-trips, recovery from missing/corrupt snapshots, and the
//! best-effort durability policy (disk failures never fail a mutation).
//! Run with: cargo test --test persistence_tests

use jsonmapdb::{JsonMap, StoreConfig, Value};
use tempfile::TempDir;

fn config(dir: &TempDir) -> StoreConfig {
    StoreConfig::new(dir.path())
}

#[tokio::test]
async fn test_set_then_get_before_restart() {
    let dir = TempDir::new().unwrap();
    let store = JsonMap::open_with(config(&dir), "users").await;

    store
        .set(
            "alice",
            Value::Array(vec![Value::Integer(1), Value::Text("x".into())]),
        )
        .await;

    assert_eq!(
        store.get("alice"),
        Some(Value::Array(vec![Value::Integer(1), Value::Text("x".into())]))
    );
}

#[tokio::test]
async fn test_round_trip_across_restart() {
    let dir = TempDir::new().unwrap();

    let store = JsonMap::open_with(config(&dir), "users").await;
    store.set("name", "Alice").await;
    store.set(42, true).await;
    drop(store);

    let reopened = JsonMap::open_with(config(&dir), "users").await;
    assert_eq!(reopened.get("name"), Some(Value::Text("Alice".into())));
    assert_eq!(reopened.get(42), Some(Value::Boolean(true)));
    assert_eq!(reopened.len(), 2);
}

#[tokio::test]
async fn test_restart_preserves_insertion_order() {
    let dir = TempDir::new().unwrap();

    let store = JsonMap::open_with(config(&dir), "ordered").await;
    store.set("c", 1).await;
    store.set("a", 2).await;
    store.set("b", 3).await;
    drop(store);

    let reopened = JsonMap::open_with(config(&dir), "ordered").await;
    let keys = reopened.keys();
    assert_eq!(keys, vec!["c".into(), "a".into(), "b".into()]);
}

#[tokio::test]
async fn test_snapshot_file_is_a_json_record_array() {
    let dir = TempDir::new().unwrap();
    let store = JsonMap::open_with(config(&dir), "shape").await;

    store.set("k", 5).await;

    let raw = std::fs::read_to_string(dir.path().join("shape.json")).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(parsed, serde_json::json!([{"key": "k", "value": 5}]));
}

#[tokio::test]
async fn test_delete_is_persisted() {
    let dir = TempDir::new().unwrap();

    let store = JsonMap::open_with(config(&dir), "users").await;
    store.set("a", 1).await;
    store.set("b", 2).await;
    assert!(store.delete("a").await);
    assert!(!store.delete("a").await);
    drop(store);

    let reopened = JsonMap::open_with(config(&dir), "users").await;
    assert!(!reopened.has("a"));
    assert_eq!(reopened.get("b"), Some(Value::Integer(2)));
}

#[tokio::test]
async fn test_clear_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let store = JsonMap::open_with(config(&dir), "users").await;

    store.set("a", 1).await;

    for _ in 0..2 {
        store.clear().await;
        assert!(store.is_empty());
        let raw = std::fs::read_to_string(dir.path().join("users.json")).unwrap();
        assert_eq!(raw, "[]");
    }
}

#[tokio::test]
async fn test_open_missing_snapshot_starts_empty() {
    let dir = TempDir::new().unwrap();
    let store = JsonMap::open_with(config(&dir), "fresh").await;

    assert!(store.is_empty());
    assert_eq!(store.get("anything"), None);
}

#[tokio::test]
async fn test_open_corrupt_snapshot_starts_empty() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("broken.json"), "this is not json").unwrap();

    let store = JsonMap::open_with(config(&dir), "broken").await;
    assert!(store.is_empty());

    // The next mutation rewrites a valid snapshot over the garbage
    store.set("k", 1).await;
    drop(store);

    let reopened = JsonMap::open_with(config(&dir), "broken").await;
    assert_eq!(reopened.get("k"), Some(Value::Integer(1)));
}

#[tokio::test]
async fn test_delete_file_tears_down_store() {
    let dir = TempDir::new().unwrap();
    let store = JsonMap::open_with(config(&dir), "users").await;

    store.set("a", 1).await;
    assert!(dir.path().join("users.json").exists());

    store.delete_file().await;
    assert!(store.is_empty());
    assert!(!dir.path().join("users.json").exists());

    // Idempotent, like removing a nonexistent file
    store.delete_file().await;

    // The store is still usable afterwards
    store.set("b", 2).await;
    drop(store);
    let reopened = JsonMap::open_with(config(&dir), "users").await;
    assert_eq!(reopened.get("b"), Some(Value::Integer(2)));
}

#[tokio::test]
async fn test_memory_only_store_never_touches_disk() {
    let store = JsonMap::in_memory();

    store.set("a", 1).await;
    store.clear().await;
    store.set("b", 2).await;
    store.delete_file().await;
    store.set("c", 3).await;

    assert_eq!(store.identity(), None);
    assert_eq!(store.snapshot_path(), None);
    assert_eq!(store.get("c"), Some(Value::Integer(3)));
}

#[tokio::test]
async fn test_write_failure_keeps_in_memory_state() {
    let dir = TempDir::new().unwrap();
    // A plain file where the data directory should be makes every
    // snapshot write fail
    let blocked = dir.path().join("blocked");
    std::fs::write(&blocked, b"").unwrap();

    let store = JsonMap::open_with(StoreConfig::new(blocked.join("sub")), "users").await;
    store.set("a", 1).await;
    let bumped = store.inc("a", None).await;

    // Mutations still report success through the in-memory view
    assert_eq!(bumped, Some(Value::Integer(2)));
    assert_eq!(store.get("a"), Some(Value::Integer(2)));
}

#[tokio::test]
async fn test_same_identity_same_file() {
    let dir = TempDir::new().unwrap();

    let first = JsonMap::open_with(config(&dir), "shared").await;
    first.set("k", 1).await;
    let path = first.snapshot_path().unwrap().to_path_buf();
    drop(first);

    let second = JsonMap::open_with(config(&dir), "shared").await;
    assert_eq!(second.snapshot_path(), Some(path.as_path()));
    assert_eq!(second.get("k"), Some(Value::Integer(1)));
}
