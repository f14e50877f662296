// ============================================================================
// jsonmapdb Library
// ============================================================================

//! An embedded, in-memory JSON map with best-effort on-disk persistence.
//!
//! `jsonmapdb` keeps an insertion-ordered map of string or integer keys to
//! JSON-shaped values. Every mutation updates the in-memory table and then
//! reconciles the change into a snapshot file (a JSON array of
//! `{"key", "value"}` records), so the data survives a process restart
//! without an external database.
//!
//! # Durability trade-off
//!
//! Persistence is **best-effort by design**: a failed snapshot write is
//! logged and swallowed, and the in-memory mutation still succeeds. The
//! table is the source of truth for reads; the snapshot is the source of
//! truth for recovery. The one loud failure is [`JsonMap::math`] with an
//! unrecognized operator, which returns
//! [`StoreError::InvalidOperation`].
//!
//! # Examples
//!
//! A memory-only store (no identity, nothing ever touches disk):
//!
//! ```
//! use jsonmapdb::{JsonMap, Value};
//!
//! # tokio_test::block_on(async {
//! let store = JsonMap::in_memory();
//!
//! store.set("name", "Alice").await;
//! store.set("logins", 1).await;
//! assert_eq!(store.inc("logins", None).await, Some(Value::Integer(2)));
//!
//! assert_eq!(store.get("name"), Some(Value::Text("Alice".into())));
//! assert_eq!(store.get("logins"), Some(Value::Integer(2)));
//! # });
//! ```
//!
//! A named store persists across constructions against the same identity:
//!
//! ```
//! use jsonmapdb::{JsonMap, StoreConfig, Value};
//!
//! # tokio_test::block_on(async {
//! # let dir = tempfile::TempDir::new().unwrap();
//! # let config = StoreConfig::new(dir.path());
//! let store = JsonMap::open_with(config.clone(), "profiles").await;
//! store.set("alice", Value::Array(vec![Value::Integer(1)])).await;
//! store.push("alice", 2).await;
//! drop(store);
//!
//! // Simulated restart
//! let reopened = JsonMap::open_with(config, "profiles").await;
//! assert_eq!(
//!     reopened.get("alice"),
//!     Some(Value::Array(vec![Value::Integer(1), Value::Integer(2)]))
//! );
//! # });
//! ```

pub mod core;
pub mod facade;
pub mod storage;

// Re-export the public surface
pub use self::core::{Entry, Key, MathOp, Result, StoreError, Value};
pub use self::facade::JsonMap;
pub use self::storage::StoreConfig;
