//! Key-value persistence.
//!
//! The engine treats persistent storage as an external string store with
//! get/set/remove primitives, mirroring the browser-style storage the state
//! originally lived in. Consumers serialize their own state to JSON strings
//! and tolerate absence and malformed data; nothing in this module surfaces
//! a read error.

pub mod keys;
pub mod kv;

pub use kv::{DiskStore, KvStore, MemoryStore};
