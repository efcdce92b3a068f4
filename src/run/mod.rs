// src/run/mod.rs

//! Executing composed units.
//!
//! - [`result`] defines the transient [`RunResult`](result::RunResult) value
//!   produced by every task and composite execution.
//! - [`runner`] walks a [`Unit`](crate::task::Unit) tree: series members in
//!   order with fail-fast, parallel members concurrently with
//!   run-to-completion siblings.

pub mod result;
pub mod runner;

pub use result::{RunResult, TransformFailure};
pub use runner::run;
