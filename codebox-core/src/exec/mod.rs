//! Remote code execution.
//!
//! ### types.rs
//! The caller-facing request/result pair and the execution service's wire
//! shapes (one named source file in, compile/run phases out).
//!
//! ### gateway.rs
//! The gateway itself: builds the provider request, dispatches through the
//! backend seam, folds compile/run phases into a normalized result, and
//! keeps the best-effort per-file output cache. The gateway never returns
//! an error: faults of every kind (compile, runtime, network) come back as
//! well-formed failed results.
//!
//! ### remote.rs
//! The HTTP backend for production use.
//!
//! ### mock.rs
//! A scripted backend so tests can exercise normalization without a
//! network.
//!
//! ### sanitize.rs
//! Cleanup of provider diagnostics so output reads like it came straight
//! from a compiler or interpreter, with no trace of the intermediary
//! service.

pub mod gateway;
pub mod mock;
pub mod remote;
pub mod sanitize;
pub mod types;

pub use gateway::{ExecutionBackend, ExecutionConfig, ExecutionGateway};
pub use types::{ExecutionRequest, ExecutionResult};
