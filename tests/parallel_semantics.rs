use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use buildwatch::config::ConfigFile;
use buildwatch::notifier::LogNotifier;
use buildwatch::run::runner;
use buildwatch::task::{parallel, TaskBody, TaskRegistry, Unit};
use buildwatch::transform::{InvokeContext, TransformUnit};
use buildwatch::Orchestrator;
use tempfile::tempdir;

type TestResult = Result<(), Box<dyn Error>>;

/// Writes a marker file after a short delay, proving the member ran to
/// completion despite a failing sibling.
struct Marker {
    id: String,
    path: PathBuf,
}

impl TransformUnit for Marker {
    fn id(&self) -> &str {
        &self.id
    }

    fn invoke(&self, _ctx: &InvokeContext) -> anyhow::Result<()> {
        std::thread::sleep(Duration::from_millis(50));
        fs::write(&self.path, self.id.as_bytes())?;
        Ok(())
    }
}

struct Fails {
    id: String,
}

impl TransformUnit for Fails {
    fn id(&self) -> &str {
        &self.id
    }

    fn invoke(&self, _ctx: &InvokeContext) -> anyhow::Result<()> {
        anyhow::bail!("{} blew up", self.id);
    }
}

fn orchestrator(registry: TaskRegistry) -> Arc<Orchestrator> {
    Arc::new(Orchestrator {
        config: ConfigFile::default(),
        registry,
        notifier: Arc::new(LogNotifier),
    })
}

#[tokio::test]
async fn failing_sibling_does_not_cancel_parallel_members() -> TestResult {
    let dir = tempdir()?;
    let marker = dir.path().join("a.ran");

    let mut registry = TaskRegistry::new();
    registry.register(
        "a",
        TaskBody::transform(Arc::new(Marker {
            id: "a".to_string(),
            path: marker.clone(),
        })),
    )?;
    registry.register(
        "b",
        TaskBody::transform(Arc::new(Fails {
            id: "b".to_string(),
        })),
    )?;

    let orch = orchestrator(registry);
    let result = runner::run(orch, parallel([Unit::task("a"), Unit::task("b")])).await;

    assert!(!result.is_success());
    assert_eq!(result.failures().len(), 1);
    assert_eq!(result.failures()[0].unit, "b");
    assert!(marker.exists(), "successful sibling was cancelled");
    Ok(())
}

#[tokio::test]
async fn all_parallel_failures_are_collected() -> TestResult {
    let dir = tempdir()?;

    let mut registry = TaskRegistry::new();
    registry.register(
        "ok",
        TaskBody::transform(Arc::new(Marker {
            id: "ok".to_string(),
            path: dir.path().join("ok.ran"),
        })),
    )?;
    registry.register(
        "bad1",
        TaskBody::transform(Arc::new(Fails {
            id: "bad1".to_string(),
        })),
    )?;
    registry.register(
        "bad2",
        TaskBody::transform(Arc::new(Fails {
            id: "bad2".to_string(),
        })),
    )?;

    let orch = orchestrator(registry);
    let unit = parallel([Unit::task("bad1"), Unit::task("ok"), Unit::task("bad2")]);
    let result = runner::run(orch, unit).await;

    let mut units: Vec<&str> = result.failures().iter().map(|f| f.unit.as_str()).collect();
    units.sort();
    assert_eq!(units, vec!["bad1", "bad2"]);
    Ok(())
}

#[tokio::test]
async fn nested_series_inside_parallel_keeps_its_own_ordering() -> TestResult {
    let dir = tempdir()?;
    let first = dir.path().join("first.ran");
    let second = dir.path().join("second.ran");

    let mut registry = TaskRegistry::new();
    registry.register(
        "first",
        TaskBody::transform(Arc::new(Marker {
            id: "first".to_string(),
            path: first.clone(),
        })),
    )?;
    registry.register(
        "fail_then",
        TaskBody::transform(Arc::new(Fails {
            id: "fail_then".to_string(),
        })),
    )?;
    registry.register(
        "second",
        TaskBody::transform(Arc::new(Marker {
            id: "second".to_string(),
            path: second.clone(),
        })),
    )?;

    // parallel( series(first, fail_then, second), ... ): the inner series is
    // still fail-fast even though it runs inside a parallel group.
    let unit = parallel([buildwatch::task::series([
        Unit::task("first"),
        Unit::task("fail_then"),
        Unit::task("second"),
    ])]);

    let orch = orchestrator(registry);
    let result = runner::run(orch, unit).await;

    assert!(!result.is_success());
    assert!(first.exists());
    assert!(!second.exists());
    Ok(())
}
