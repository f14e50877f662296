//! The public store type: an in-memory JSON map whose mutations are
//! mirrored, best-effort, to an on-disk snapshot.

use crate::core::{Entry, Key, MathOp, Result, Value};
use crate::storage::{SnapshotCache, SnapshotCodec, StoreConfig, Table};
use std::path::Path;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Persistence backing for a named store: the codec owning the snapshot
/// file plus the cache of its last-loaded sequence.
struct Backing {
    identity: String,
    codec: SnapshotCodec,
    cache: SnapshotCache,
}

struct StoreInner {
    table: RwLock<Table>,
    backing: Option<Backing>,
    /// Serializes every mutating operation across its full
    /// table-mutate / reconcile / persist sequence. Without it, two
    /// overlapping read-modify-write cycles on the snapshot could lose
    /// one of the updates.
    mutate_lock: Mutex<()>,
}

/// An insertion-ordered map from string or integer keys to JSON-shaped
/// values, hydrated from an on-disk snapshot at construction and
/// re-persisted on every mutation.
///
/// Cloning is cheap and yields a handle to the same store; handles are
/// `Send + Sync` and can be shared across tasks. Mutating operations are
/// async and serialized internally; read operations are synchronous,
/// consult only the in-memory table, and return owned clones -- all
/// mutation goes through the mutating API.
///
/// Durability is **best-effort** by design: a failed snapshot write is
/// logged and swallowed, the in-memory mutation still wins and the call
/// still reports success. Only `math` with an unrecognized operator
/// fails loudly.
#[derive(Clone)]
pub struct JsonMap {
    inner: Arc<StoreInner>,
}

impl JsonMap {
    /// A memory-only store: no snapshot location exists and every
    /// persistence step is a no-op for the store's whole lifetime.
    pub fn in_memory() -> Self {
        Self::from_parts(Table::new(), None)
    }

    /// Opens the store named `identity` under the default data directory,
    /// hydrating the table from its snapshot.
    pub async fn open(identity: &str) -> Self {
        Self::open_with(StoreConfig::default(), identity).await
    }

    /// Opens the store named `identity` under `config.data_dir`.
    ///
    /// A missing or corrupt snapshot is not an error: the store starts
    /// empty and the snapshot is recreated by the next mutation.
    pub async fn open_with(config: StoreConfig, identity: &str) -> Self {
        let codec = SnapshotCodec::new(config.snapshot_path(identity));
        let cache = SnapshotCache::new();

        let table = match codec.load().await {
            Ok(entries) => {
                cache.replace(entries.clone());
                Table::from_entries(entries)
            }
            Err(err) if err.is_recoverable() => {
                debug!(identity, error = %err, "no snapshot history; starting empty");
                Table::new()
            }
            Err(err) => {
                warn!(identity, error = %err, "snapshot read failed; starting empty");
                Table::new()
            }
        };

        Self::from_parts(
            table,
            Some(Backing {
                identity: identity.to_string(),
                codec,
                cache,
            }),
        )
    }

    fn from_parts(table: Table, backing: Option<Backing>) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                table: RwLock::new(table),
                backing,
                mutate_lock: Mutex::new(()),
            }),
        }
    }

    /// The store's identity, or `None` for a memory-only store.
    pub fn identity(&self) -> Option<&str> {
        self.inner
            .backing
            .as_ref()
            .map(|backing| backing.identity.as_str())
    }

    /// Where the snapshot lives, or `None` for a memory-only store.
    pub fn snapshot_path(&self) -> Option<&Path> {
        self.inner
            .backing
            .as_ref()
            .map(|backing| backing.codec.path())
    }

    pub(crate) fn read_table(&self) -> RwLockReadGuard<'_, Table> {
        self.inner.table.read().unwrap_or_else(|err| err.into_inner())
    }

    fn write_table(&self) -> RwLockWriteGuard<'_, Table> {
        self.inner
            .table
            .write()
            .unwrap_or_else(|err| err.into_inner())
    }

    // ------------------------------------------------------------------
    // Reconciliation
    // ------------------------------------------------------------------

    /// Runs one read-modify-write cycle against the snapshot: obtain the
    /// current on-disk sequence (cache first, then disk), apply `patch`,
    /// rewrite the file in full. No-op for memory-only stores.
    ///
    /// Callers hold `mutate_lock` for the whole enclosing operation.
    async fn reconcile(&self, patch: impl FnOnce(&mut Vec<Entry>)) {
        let Some(backing) = &self.inner.backing else {
            return;
        };

        let mut entries = match backing.cache.get() {
            Some(entries) => entries,
            None => match backing.codec.load().await {
                Ok(entries) => entries,
                Err(err) if err.is_recoverable() => {
                    // Expected path for a first write
                    debug!(
                        identity = %backing.identity,
                        error = %err,
                        "no snapshot to reconcile; starting from empty"
                    );
                    Vec::new()
                }
                Err(err) => {
                    warn!(
                        identity = %backing.identity,
                        error = %err,
                        "snapshot read failed during reconcile; starting from empty"
                    );
                    Vec::new()
                }
            },
        };

        patch(&mut entries);

        match backing.codec.store(&entries).await {
            Ok(()) => backing.cache.replace(entries),
            Err(err) => {
                // In-memory state wins; disk retries on the next mutation.
                warn!(
                    identity = %backing.identity,
                    error = %err,
                    "snapshot write failed; keeping in-memory state"
                );
                backing.cache.invalidate();
            }
        }
    }

    /// Persists one key's current value: replace the matching snapshot
    /// entry or append a new one.
    async fn persist_set(&self, key: Key, value: Value) {
        self.reconcile(|entries| {
            match entries.iter_mut().find(|entry| entry.key == key) {
                Some(entry) => entry.value = value,
                None => entries.push(Entry { key, value }),
            }
        })
        .await;
    }

    // ------------------------------------------------------------------
    // Mutating operations
    // ------------------------------------------------------------------

    /// Sets `key` to `value`, replacing any previous value.
    pub async fn set(&self, key: impl Into<Key>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();

        let _guard = self.inner.mutate_lock.lock().await;
        self.write_table().insert(key.clone(), value.clone());
        self.persist_set(key, value).await;
    }

    /// Removes `key`. Returns whether it was present.
    pub async fn delete(&self, key: impl Into<Key>) -> bool {
        let key = key.into();

        let _guard = self.inner.mutate_lock.lock().await;
        let removed = self.write_table().remove(&key);
        self.reconcile(|entries| entries.retain(|entry| entry.key != key))
            .await;
        removed
    }

    /// Empties the table and truncates the snapshot to an empty sequence.
    pub async fn clear(&self) {
        let _guard = self.inner.mutate_lock.lock().await;
        self.write_table().clear();
        self.reconcile(|entries| entries.clear()).await;
    }

    /// Removes the snapshot file (idempotent) and empties the table.
    /// Full teardown for a named store.
    pub async fn delete_file(&self) {
        let _guard = self.inner.mutate_lock.lock().await;
        self.write_table().clear();

        let Some(backing) = &self.inner.backing else {
            return;
        };
        if let Err(err) = backing.codec.remove().await {
            warn!(
                identity = %backing.identity,
                error = %err,
                "snapshot delete failed"
            );
        }
        backing.cache.invalidate();
    }

    // ------------------------------------------------------------------
    // Structured mutation helpers
    // ------------------------------------------------------------------

    /// Sets one field inside an object value, addressed as
    /// `"outerKey.innerField"`, then persists the outer entry.
    ///
    /// Returns the updated outer value, or `None` when the path has no
    /// dot, the outer key is absent, or its value is not an object.
    pub async fn set_prop(&self, path: &str, value: impl Into<Value>) -> Option<Value> {
        let (outer, field) = path.split_once('.')?;
        let key = Key::from(outer);
        let value = value.into();

        let _guard = self.inner.mutate_lock.lock().await;
        let updated = {
            let mut table = self.write_table();
            let stored = table.get_mut(&key)?;
            let fields = stored.as_object_mut()?;
            fields.insert(field.to_string(), value);
            stored.clone()
        };
        self.persist_set(key, updated.clone()).await;
        Some(updated)
    }

    /// Appends `value` to the array stored under `key`.
    ///
    /// Returns the updated array, or `None` (no-op, nothing persisted)
    /// when the stored value is not an array.
    pub async fn push(&self, key: impl Into<Key>, value: impl Into<Value>) -> Option<Vec<Value>> {
        let key = key.into();
        let value = value.into();

        let _guard = self.inner.mutate_lock.lock().await;
        let items = {
            let mut table = self.write_table();
            let items = table.get_mut(&key)?.as_array_mut()?;
            items.push(value);
            items.clone()
        };
        self.persist_set(key, Value::Array(items.clone())).await;
        Some(items)
    }

    /// Removes elements equal to `value` from the array stored under
    /// `key` -- all of them, or only the first match when `first_only`.
    ///
    /// Returns the updated array, or `None` when the stored value is not
    /// an array.
    pub async fn splice(
        &self,
        key: impl Into<Key>,
        value: impl Into<Value>,
        first_only: bool,
    ) -> Option<Vec<Value>> {
        let key = key.into();
        let value = value.into();

        let _guard = self.inner.mutate_lock.lock().await;
        let items = {
            let mut table = self.write_table();
            let items = table.get_mut(&key)?.as_array_mut()?;
            if first_only {
                if let Some(pos) = items.iter().position(|item| *item == value) {
                    items.remove(pos);
                }
            } else {
                items.retain(|item| *item != value);
            }
            items.clone()
        };
        self.persist_set(key, Value::Array(items.clone())).await;
        Some(items)
    }

    /// Replaces elements equal to `value` with `replacement` in the array
    /// stored under `key` -- all of them, or only the first match when
    /// `first_only`.
    ///
    /// Returns the updated array, or `None` when the stored value is not
    /// an array.
    pub async fn replace(
        &self,
        key: impl Into<Key>,
        value: impl Into<Value>,
        replacement: impl Into<Value>,
        first_only: bool,
    ) -> Option<Vec<Value>> {
        let key = key.into();
        let value = value.into();
        let replacement = replacement.into();

        let _guard = self.inner.mutate_lock.lock().await;
        let items = {
            let mut table = self.write_table();
            let items = table.get_mut(&key)?.as_array_mut()?;
            if first_only {
                if let Some(pos) = items.iter().position(|item| *item == value) {
                    items[pos] = replacement;
                }
            } else {
                for item in items.iter_mut() {
                    if *item == value {
                        *item = replacement.clone();
                    }
                }
            }
            items.clone()
        };
        self.persist_set(key, Value::Array(items.clone())).await;
        Some(items)
    }

    /// Increments the numeric value under `key`, or the numeric field
    /// `obj_key` inside an object value. Returns the new number, or
    /// `None` when the target is not numeric.
    pub async fn inc(&self, key: impl Into<Key>, obj_key: Option<&str>) -> Option<Value> {
        self.apply_math(key.into(), MathOp::Add, Value::Integer(1), obj_key)
            .await
    }

    /// Decrements the numeric value under `key`, or the numeric field
    /// `obj_key` inside an object value. Returns the new number, or
    /// `None` when the target is not numeric.
    pub async fn dec(&self, key: impl Into<Key>, obj_key: Option<&str>) -> Option<Value> {
        self.apply_math(key.into(), MathOp::Sub, Value::Integer(1), obj_key)
            .await
    }

    /// Applies `operation` (`+ - * / ^`, where `^` is exponentiation) with
    /// `operand` to the numeric value under `key`, or to the numeric
    /// field `obj_key` inside an object value.
    ///
    /// An unrecognized operator symbol fails with `InvalidOperation`
    /// before anything is touched -- the one loud failure in the crate.
    /// A non-numeric target yields `Ok(None)` and mutates nothing.
    pub async fn math(
        &self,
        key: impl Into<Key>,
        operation: &str,
        operand: impl Into<Value>,
        obj_key: Option<&str>,
    ) -> Result<Option<Value>> {
        let op = MathOp::parse(operation)?;
        Ok(self.apply_math(key.into(), op, operand.into(), obj_key).await)
    }

    async fn apply_math(
        &self,
        key: Key,
        op: MathOp,
        operand: Value,
        obj_key: Option<&str>,
    ) -> Option<Value> {
        let _guard = self.inner.mutate_lock.lock().await;
        let (persisted, updated) = {
            let mut table = self.write_table();
            let stored = table.get_mut(&key)?;
            let target = match obj_key {
                Some(field) => stored.as_object_mut()?.get_mut(field)?,
                None => stored,
            };
            let updated = op.apply(target, &operand)?;
            *target = updated.clone();
            (table.get(&key)?.clone(), updated)
        };
        self.persist_set(key, persisted).await;
        Some(updated)
    }
}
