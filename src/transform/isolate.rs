// src/transform/isolate.rs

//! Error isolation layer around transform invocations.
//!
//! Every transform body runs through [`invoke`]. A failure (an `Err` from the
//! unit, or a panic on the worker thread) is classified by the originating
//! unit, reported through the notification channel and the operator log, and
//! converted into a plain [`RunResult`] value. Nothing a transform does can
//! terminate the watch session.

use std::sync::Arc;

use tracing::{debug, error};

use crate::notifier::Notifier;
use crate::run::result::RunResult;
use crate::transform::{InvokeContext, TransformUnit};

/// Invoke one transform unit on a blocking worker thread and absorb any
/// failure into a [`RunResult`].
pub async fn invoke(
    unit: Arc<dyn TransformUnit>,
    ctx: InvokeContext,
    notifier: Arc<dyn Notifier>,
) -> RunResult {
    let id = unit.id().to_string();
    debug!(unit = %id, "invoking transform");

    let joined = tokio::task::spawn_blocking(move || unit.invoke(&ctx)).await;

    match joined {
        Ok(Ok(())) => {
            debug!(unit = %id, "transform succeeded");
            RunResult::Success
        }
        Ok(Err(err)) => report(notifier.as_ref(), &id, format!("{err:#}")),
        Err(join_err) => {
            let message = if join_err.is_panic() {
                format!("transform panicked: {join_err}")
            } else {
                format!("transform was aborted: {join_err}")
            };
            report(notifier.as_ref(), &id, message)
        }
    }
}

fn report(notifier: &dyn Notifier, unit: &str, message: String) -> RunResult {
    error!(unit = %unit, "transform failed: {message}");
    notifier.notify("buildwatch", &format!("There was an error with '{unit}'. See log."));
    RunResult::failure(unit, message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifier::LogNotifier;
    use std::path::PathBuf;

    struct Panics;

    impl TransformUnit for Panics {
        fn id(&self) -> &str {
            "panics"
        }

        fn invoke(&self, _ctx: &InvokeContext) -> anyhow::Result<()> {
            panic!("boom");
        }
    }

    #[tokio::test]
    async fn a_panicking_transform_becomes_a_failure_result() {
        let ctx = InvokeContext {
            source_dir: PathBuf::from("."),
            output_dir: PathBuf::from("."),
        };
        let result = invoke(Arc::new(Panics), ctx, Arc::new(LogNotifier)).await;

        let failures = result.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].unit, "panics");
        assert!(failures[0].message.contains("panicked"));
    }
}
