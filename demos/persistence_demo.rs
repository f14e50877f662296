//! Persistence demo: the same named store across two boots.
//!
//! Boot #1 creates a store, writes through the structured helpers and
//! lets the snapshot land on disk. Boot #2 constructs a fresh store
//! against the same identity and finds everything still there.
//!
//! Run with:
//!   cargo run --example persistence_demo

use anyhow::Result;
use jsonmapdb::{JsonMap, StoreConfig, Value};
use std::collections::BTreeMap;

#[tokio::main]
async fn main() -> Result<()> {
    println!("=== jsonmapdb Persistence Demo ===\n");

    let data_root = std::env::temp_dir().join("jsonmapdb_persistence_demo");
    let config = StoreConfig::new(&data_root);

    println!("1) Boot #1: populate the store");
    {
        let store = JsonMap::open_with(config.clone(), "players").await;
        store.delete_file().await;

        store.set("alice", Value::Object(BTreeMap::new())).await;
        store.set_prop("alice.level", 1).await;
        store.set_prop("alice.class", "mage").await;

        store
            .set("scores", Value::Array(vec![Value::Integer(10)]))
            .await;
        store.push("scores", 25).await;

        store.set("boots", 0).await;
        store.inc("boots", None).await;

        println!("   {} entries written to {:?}", store.len(), store.snapshot_path().unwrap());
    }

    println!("2) Boot #2: reopen the same identity");
    let store = JsonMap::open_with(config, "players").await;
    println!("   recovered {} entries:", store.len());
    store.for_each(|key, value| println!("   {} = {}", key, value));

    store.inc("boots", None).await;
    println!("   boots incremented to {}", store.get("boots").unwrap());

    store.delete_file().await;
    println!("3) Snapshot removed; demo directory is clean");

    Ok(())
}
