//! Thread-Safe Key-Value Store
//!
//! A single `HashMap` behind one `RwLock`. Writers (`put`, `del`) take the
//! exclusive lock, readers (`get`, `size`) share it. Every operation is a
//! single critical section, so each one is linearizable on its own: a reader
//! sees either the value before a write or the value after it, never a mix.
//!
//! ## Concurrency Model
//!
//! ```text
//! ┌───────────────────────────────────────────┐
//! │              KeyValueStore                │
//! │  ┌─────────────────────────────────────┐  │
//! │  │   RwLock<HashMap<Bytes, Bytes>>     │  │
//! │  │                                     │  │
//! │  │  put/del  -> write() (exclusive)    │  │
//! │  │  get/size -> read()  (shared)       │  │
//! │  └─────────────────────────────────────┘  │
//! └───────────────────────────────────────────┘
//! ```
//!
//! There is deliberately no sharding: one map, one lock.

use bytes::Bytes;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// The in-memory key-value store shared by every connection.
///
/// Wrap it in an `Arc` and hand a clone to each connection task.
///
/// # Example
///
/// ```
/// use kvss::storage::KeyValueStore;
/// use bytes::Bytes;
///
/// let store = KeyValueStore::new();
///
/// assert!(store.put(Bytes::from("name"), Bytes::from("kvss")));
/// assert_eq!(store.get(b"name"), Some(Bytes::from("kvss")));
/// assert!(store.del(b"name"));
/// assert_eq!(store.size(), 0);
/// ```
#[derive(Debug, Default)]
pub struct KeyValueStore {
    data: RwLock<HashMap<Bytes, Bytes>>,
}

impl KeyValueStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    // A panic never happens while a guard is held, so a poisoned map is
    // still consistent and can be used as-is.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<Bytes, Bytes>> {
        self.data.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<Bytes, Bytes>> {
        self.data.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Inserts or overwrites a key.
    ///
    /// # Returns
    ///
    /// Returns `true` if the key did not exist before, `false` if an existing
    /// value was replaced.
    pub fn put(&self, key: Bytes, value: Bytes) -> bool {
        self.write().insert(key, value).is_none()
    }

    /// Returns a copy of the current value for `key`, if any.
    ///
    /// `Bytes` clones are reference-counted, so the caller gets its own handle
    /// and never a borrow into the map.
    pub fn get(&self, key: &[u8]) -> Option<Bytes> {
        self.read().get(key).cloned()
    }

    /// Removes `key`. Returns whether a value was actually removed.
    pub fn del(&self, key: &[u8]) -> bool {
        self.write().remove(key).is_some()
    }

    /// Number of live keys.
    pub fn size(&self) -> usize {
        self.read().len()
    }

    /// Returns true if the store holds no keys.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}
