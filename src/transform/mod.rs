// src/transform/mod.rs

//! Transform units: the external compilers and processors invoked by task
//! bodies.
//!
//! The orchestrator only knows the narrow [`TransformUnit`] contract; what a
//! unit actually does (render templates, compile styles, bundle scripts,
//! copy assets) is opaque to it. Concrete units:
//!
//! - [`command::CommandTransform`] shells out to a configured toolchain.
//! - [`copy::CopyAssets`] copies matching files into the output tree.
//! - [`clean::CleanDir`] deletes an output subtree.
//!
//! Every invocation goes through [`isolate`], which classifies failures by
//! unit, notifies, logs, and converts them into plain run results instead of
//! letting them take down the process.

pub mod clean;
pub mod command;
pub mod copy;
pub mod isolate;

use std::path::PathBuf;

/// Directories a transform invocation operates on.
#[derive(Debug, Clone)]
pub struct InvokeContext {
    /// Root of the pipeline sources.
    pub source_dir: PathBuf,
    /// Root of the output tree.
    pub output_dir: PathBuf,
}

/// A single external transform step.
///
/// `invoke` may block (file IO, spawning a compiler); the runner executes it
/// on a blocking worker thread so the watch event loop keeps accepting
/// events. Implementations must be deterministic functions of their inputs:
/// invoking a unit twice with unchanged sources must leave the output tree
/// byte-identical.
pub trait TransformUnit: Send + Sync {
    /// Stable identifier used to classify failures (usually the task name).
    fn id(&self) -> &str;

    /// Read sources, write artifacts. An `Err` is a transform failure; it is
    /// absorbed by the isolation layer, never propagated as a process fault.
    fn invoke(&self, ctx: &InvokeContext) -> anyhow::Result<()>;
}
