// src/engine/mod.rs

//! Reactive rebuild engine.
//!
//! This module ties together:
//! - the per-binding dispatch state machine (idle / running / pending) that
//!   coalesces triggers arriving while a rebuild is in flight
//! - the main event loop that reacts to:
//!   - binding triggers from the file watcher
//!   - rebuild completions (success reloads the dev server, failure is
//!     absorbed and the session stays alive)
//!   - shutdown signals

pub mod dispatch;
pub mod runtime;

pub use dispatch::{BindingState, DispatchTable};
pub use runtime::{Engine, EngineEvent};
