//! Storage Module
//!
//! The process-wide, in-memory key-value map. Nothing is persisted; the
//! contents live exactly as long as the server process.
//!
//! ## Example
//!
//! ```
//! use kvss::storage::KeyValueStore;
//! use bytes::Bytes;
//! use std::sync::Arc;
//!
//! let store = Arc::new(KeyValueStore::new());
//!
//! store.put(Bytes::from("name"), Bytes::from("kvss"));
//! assert_eq!(store.get(b"name"), Some(Bytes::from("kvss")));
//! ```

pub mod store;

pub use store::KeyValueStore;
