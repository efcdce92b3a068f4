// src/engine/dispatch.rs

use tracing::{debug, warn};

/// Dispatch state of one watch binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingState {
    /// No triggers pending, no run in flight.
    Idle,
    /// The binding's action is currently executing.
    Running,
    /// A matching event arrived while `Running`; exactly one re-run is owed.
    Pending,
}

/// Pure per-binding state machine.
///
/// Transitions:
/// - `Idle -> Running` on a matching event (the caller starts a run).
/// - `Running -> Pending` on a matching event (coalesced, no new run).
/// - `Running -> Idle` on completion with nothing pending.
/// - `Pending -> Running` on completion (the caller starts exactly one
///   re-run, regardless of how many events were coalesced).
///
/// This bounds each binding to one in-flight run while guaranteeing no
/// matching change is dropped.
#[derive(Debug)]
pub struct DispatchTable {
    states: Vec<BindingState>,
}

impl DispatchTable {
    pub fn new(bindings: usize) -> Self {
        Self {
            states: vec![BindingState::Idle; bindings],
        }
    }

    pub fn state(&self, binding: usize) -> BindingState {
        self.states[binding]
    }

    /// Record a matching event for a binding. Returns `true` if the caller
    /// should start a run now.
    pub fn on_trigger(&mut self, binding: usize) -> bool {
        match self.states[binding] {
            BindingState::Idle => {
                self.states[binding] = BindingState::Running;
                true
            }
            BindingState::Running => {
                debug!(binding, "event during active run; marking pending");
                self.states[binding] = BindingState::Pending;
                false
            }
            BindingState::Pending => {
                debug!(binding, "event coalesced into pending re-run");
                false
            }
        }
    }

    /// Record completion of a binding's run (success or failure). Returns
    /// `true` if the caller should immediately start the coalesced re-run.
    pub fn on_finished(&mut self, binding: usize) -> bool {
        match self.states[binding] {
            BindingState::Pending => {
                self.states[binding] = BindingState::Running;
                true
            }
            BindingState::Running => {
                self.states[binding] = BindingState::Idle;
                false
            }
            BindingState::Idle => {
                warn!(binding, "completion for a binding with no run in flight");
                false
            }
        }
    }
}
