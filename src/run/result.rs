// src/run/result.rs

/// A transform step that failed, classified by its originating unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformFailure {
    /// Identifier of the transform unit that raised the failure.
    pub unit: String,
    /// Human-readable description for the operator.
    pub message: String,
}

/// Outcome of running one task or composite.
///
/// Results are transient: they exist for one invocation's error handling and
/// logging and are never persisted. A parallel composite with several failed
/// members carries *all* of their failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunResult {
    Success,
    Failure(Vec<TransformFailure>),
}

impl RunResult {
    /// Single-failure constructor used by the isolation layer.
    pub fn failure(unit: impl Into<String>, message: impl Into<String>) -> Self {
        RunResult::Failure(vec![TransformFailure {
            unit: unit.into(),
            message: message.into(),
        }])
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RunResult::Success)
    }

    /// Failures carried by this result; empty for a success.
    pub fn failures(&self) -> &[TransformFailure] {
        match self {
            RunResult::Success => &[],
            RunResult::Failure(failures) => failures,
        }
    }

    /// Fold another result into this one, accumulating failures.
    pub fn merge(self, other: RunResult) -> RunResult {
        match (self, other) {
            (RunResult::Success, other) => other,
            (this, RunResult::Success) => this,
            (RunResult::Failure(mut a), RunResult::Failure(b)) => {
                a.extend(b);
                RunResult::Failure(a)
            }
        }
    }
}
