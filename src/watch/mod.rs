// src/watch/mod.rs

//! File watching and change-to-rebuild dispatch inputs.
//!
//! This module is responsible for:
//! - Resolving and validating watch bindings (explicit root directories plus
//!   glob suffixes) once at startup (`patterns.rs`).
//! - Wiring up a cross-platform filesystem watcher (`notify`) that turns
//!   changed paths into binding triggers (`watcher.rs`).
//!
//! It does **not** know about run state or coalescing; that lives in
//! [`crate::engine`].

pub mod patterns;
pub mod watcher;

pub use patterns::{build_bindings, WatchBinding};
pub use watcher::{spawn_watcher, WatcherHandle};
