// src/run/runner.rs

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::run::result::RunResult;
use crate::task::registry::BodyKind;
use crate::task::Unit;
use crate::transform::isolate;
use crate::Orchestrator;

/// Execute a composed unit to completion and return its result.
///
/// Semantics:
/// - A bare task runs its prerequisites (`needs`, in order, fail-fast) and
///   then its body; transform bodies go through the isolation layer.
/// - A series runs members in listed order and fails immediately with the
///   failing member's result, without running subsequent members.
/// - A parallel starts every member concurrently, waits for all of them to
///   reach a terminal state, and aggregates the failures of every failed
///   member. Started siblings are never cancelled.
///
/// The function never returns an error: registry misuse surfaces as a
/// classified failure result, so a watch session can absorb it like any
/// transform failure.
pub fn run(
    orch: Arc<Orchestrator>,
    unit: Unit,
) -> Pin<Box<dyn Future<Output = RunResult> + Send>> {
    Box::pin(run_inner(orch, unit))
}

async fn run_inner(orch: Arc<Orchestrator>, unit: Unit) -> RunResult {
    match unit {
        Unit::Task(name) => run_named(orch, &name).await,
        Unit::Series(members) => {
            for member in members {
                let result = Box::pin(run(orch.clone(), member)).await;
                if !result.is_success() {
                    debug!("series member failed; skipping remaining members");
                    return result;
                }
            }
            RunResult::Success
        }
        Unit::Parallel(members) => {
            let handles: Vec<_> = members
                .into_iter()
                .map(|member| {
                    let orch = orch.clone();
                    tokio::spawn(async move { Box::pin(run(orch, member)).await })
                })
                .collect();

            let mut aggregate = RunResult::Success;
            for handle in handles {
                let result = match handle.await {
                    Ok(result) => result,
                    Err(err) => RunResult::failure("runner", format!("parallel member: {err}")),
                };
                aggregate = aggregate.merge(result);
            }
            aggregate
        }
    }
}

async fn run_named(orch: Arc<Orchestrator>, name: &str) -> RunResult {
    let body = match orch.registry.lookup(name) {
        Ok(body) => body,
        Err(err) => {
            // Config validation makes this unreachable for configured units;
            // keep the watch session alive anyway.
            warn!(task = %name, "lookup failed at run time: {err}");
            return RunResult::failure(name, err.to_string());
        }
    };

    for dep in &body.needs {
        let result = Box::pin(run(orch.clone(), Unit::task(dep))).await;
        if !result.is_success() {
            debug!(task = %name, dep = %dep, "prerequisite failed; skipping body");
            return result;
        }
    }

    match &body.kind {
        BodyKind::Transform(unit) => {
            isolate::invoke(unit.clone(), orch.invoke_context(), orch.notifier.clone()).await
        }
        BodyKind::Composite(unit) => Box::pin(run(orch.clone(), unit.clone())).await,
    }
}
