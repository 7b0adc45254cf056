//! The workspace module owns the in-memory file/folder tree.
//!
//! ### node.rs
//! Arena entries: stable ids, the File/Folder tagged union, and the cached
//! canonical path. Nothing outside the store mutates a node.
//!
//! ### store.rs
//! The store itself: all tree CRUD, path recomputation cascades, collision
//! detection, and write-through persistence. Every read and write of
//! workspace structure goes through it; a failed operation leaves the tree
//! exactly as it was.
//!
//! ### error.rs
//! The structural violations an operation can report.
//!
//! ## Paths and ids
//! A node has exactly one canonical slash-delimited path at any time, but
//! paths shift under renames and moves. Consumers that outlive structural
//! changes (open tabs, output caches) track ids and re-fetch by id; path
//! addressing is for everything that starts from user input.

pub mod error;
pub mod node;
pub mod store;

#[cfg(test)]
mod tests;

pub use error::WorkspaceError;
pub use node::{Node, NodeId, NodeKind};
pub use store::WorkspaceStore;
