//! Read-only operations: pass-through projections of the in-memory
//! table. None of these touch disk, and none fail.
//!
//! Everything is returned as an owned clone; callers mutate the store
//! through the mutating API only, so a returned value can never drift
//! from the snapshot behind the store's back.

use crate::core::{Entry, Key, Value};
use crate::facade::JsonMap;
use rand::Rng;

impl JsonMap {
    /// The value under `key`, if any.
    pub fn get(&self, key: impl Into<Key>) -> Option<Value> {
        self.read_table().get(&key.into()).cloned()
    }

    /// Whether `key` is present.
    pub fn has(&self, key: impl Into<Key>) -> bool {
        self.read_table().contains(&key.into())
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.read_table().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read_table().is_empty()
    }

    /// All key/value pairs, in insertion order.
    pub fn entries(&self) -> Vec<(Key, Value)> {
        self.read_table()
            .iter()
            .map(|entry| (entry.key.clone(), entry.value.clone()))
            .collect()
    }

    /// All keys, in insertion order.
    pub fn keys(&self) -> Vec<Key> {
        self.read_table()
            .iter()
            .map(|entry| entry.key.clone())
            .collect()
    }

    /// All values, in insertion order.
    pub fn values(&self) -> Vec<Value> {
        self.read_table()
            .iter()
            .map(|entry| entry.value.clone())
            .collect()
    }

    /// All entries as records, in insertion order.
    pub fn array(&self) -> Vec<Entry> {
        self.read_table().entries().to_vec()
    }

    /// The first value matching `predicate`.
    pub fn find(&self, predicate: impl Fn(&Value) -> bool) -> Option<Value> {
        self.read_table()
            .iter()
            .find(|entry| predicate(&entry.value))
            .map(|entry| entry.value.clone())
    }

    /// Every value matching `predicate`.
    pub fn filter(&self, predicate: impl Fn(&Value) -> bool) -> Vec<Value> {
        self.read_table()
            .iter()
            .filter(|entry| predicate(&entry.value))
            .map(|entry| entry.value.clone())
            .collect()
    }

    /// Whether any value matches `predicate`.
    pub fn some(&self, predicate: impl Fn(&Value) -> bool) -> bool {
        self.read_table().iter().any(|entry| predicate(&entry.value))
    }

    /// Projects every entry through `f`, in insertion order.
    pub fn map<T>(&self, f: impl Fn(&Key, &Value) -> T) -> Vec<T> {
        self.read_table()
            .iter()
            .map(|entry| f(&entry.key, &entry.value))
            .collect()
    }

    /// Calls `f` for every entry, in insertion order.
    pub fn for_each(&self, mut f: impl FnMut(&Key, &Value)) {
        for entry in self.read_table().iter() {
            f(&entry.key, &entry.value);
        }
    }

    /// The first entry, if any.
    pub fn first(&self) -> Option<(Key, Value)> {
        self.read_table()
            .entries()
            .first()
            .map(|entry| (entry.key.clone(), entry.value.clone()))
    }

    /// The first `count` entries (fewer when the table is smaller).
    pub fn first_n(&self, count: usize) -> Vec<(Key, Value)> {
        self.read_table()
            .iter()
            .take(count)
            .map(|entry| (entry.key.clone(), entry.value.clone()))
            .collect()
    }

    /// The last entry, if any.
    pub fn last(&self) -> Option<(Key, Value)> {
        self.read_table()
            .entries()
            .last()
            .map(|entry| (entry.key.clone(), entry.value.clone()))
    }

    /// The last `count` entries, newest first (fewer when the table is
    /// smaller).
    pub fn last_n(&self, count: usize) -> Vec<(Key, Value)> {
        self.read_table()
            .iter()
            .rev()
            .take(count)
            .map(|entry| (entry.key.clone(), entry.value.clone()))
            .collect()
    }

    /// A uniformly random entry, or `None` when the table is empty.
    pub fn random(&self) -> Option<(Key, Value)> {
        let table = self.read_table();
        if table.is_empty() {
            return None;
        }
        let index = rand::thread_rng().gen_range(0..table.len());
        table
            .entries()
            .get(index)
            .map(|entry| (entry.key.clone(), entry.value.clone()))
    }
}
