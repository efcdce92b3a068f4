// src/task/mod.rs

//! Task registry and composition.
//!
//! - [`compose`] defines the [`Unit`](compose::Unit) value tree and the pure
//!   `series` / `parallel` builders.
//! - [`registry`] maps task names to executable bodies and enforces the
//!   register-once rule.
//!
//! Neither module executes anything; running a unit is the job of
//! [`crate::run`].

pub mod compose;
pub mod registry;

pub use compose::{parallel, series, Unit};
pub use registry::{BodyKind, TaskBody, TaskRegistry};
