//! Logging facility for the engine's warning diagnostics
//!
//! Traversal, sync, and activation operations never let a recoverable
//! absence abort a bulk loop; instead they report it through `tracing`
//! at warning severity: a mirror resolution miss under the lenient
//! policy, a name-matched entry that does not exist in the source, a
//! sparse index combination skipped during copy or deactivation. This
//! module provides:
//! - Single initialization point via `init(profile)`
//! - An in-memory capture layer so tests can assert which diagnostics
//!   an operation emitted, and how many
//!
//! # Usage
//!
//! ```rust
//! use dimtree_core::logging_facility::{init, Profile};
//!
//! // Initialize once at application startup
//! init(Profile::Development);
//! ```

pub mod capture;
pub mod init;

pub use capture::{init_capture, CapturedEvent, DiagnosticCapture};
pub use init::{init, Profile};
