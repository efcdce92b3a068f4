// src/watch/watcher.rs

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::engine::EngineEvent;
use crate::errors::{BuildwatchError, Result};
use crate::watch::patterns::WatchBinding;

/// Handle for the filesystem watcher.
///
/// This exists mainly so the underlying `RecommendedWatcher` is kept alive
/// for as long as needed. Dropping this handle stops file watching.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle").finish()
    }
}

/// Spawn a filesystem watcher over every binding root and send
/// `EngineEvent::BindingTriggered` whenever a changed path matches a
/// binding's patterns.
///
/// Rapid duplicate events for the same path are expected; the engine's
/// per-binding state machine coalesces them.
pub fn spawn_watcher(
    bindings: Arc<Vec<WatchBinding>>,
    engine_tx: mpsc::Sender<EngineEvent>,
) -> Result<WatcherHandle> {
    // Each root is watched recursively; duplicates across bindings collapse.
    let roots: BTreeSet<PathBuf> = bindings
        .iter()
        .flat_map(|b| b.roots().iter().cloned())
        .collect();

    // Channel from the blocking notify callback into the async world.
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<Event>();

    let mut watcher = RecommendedWatcher::new(
        {
            let event_tx = event_tx.clone();
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if let Err(err) = event_tx.send(event) {
                        // We can't log via tracing here easily, so fall back to stderr.
                        eprintln!("buildwatch: failed to forward notify event: {err}");
                    }
                }
                Err(err) => {
                    eprintln!("buildwatch: file watch error: {err}");
                }
            }
        },
        Config::default(),
    )
    .map_err(|err| BuildwatchError::WatchSetup(err.to_string()))?;

    for root in &roots {
        watcher
            .watch(root, RecursiveMode::Recursive)
            .map_err(|err| {
                BuildwatchError::WatchSetup(format!("cannot watch {:?}: {}", root, err))
            })?;
        info!("watching {:?}", root);
    }

    // Async task that consumes notify events and forwards binding triggers
    // to the engine.
    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            debug!("received notify event: {:?}", event);

            for path in &event.paths {
                for (index, binding) in bindings.iter().enumerate() {
                    if !binding.matches_path(path) {
                        continue;
                    }
                    debug!(
                        binding = %binding.name(),
                        path = %path.display(),
                        "watch match -> triggering binding"
                    );
                    if let Err(err) = engine_tx
                        .send(EngineEvent::BindingTriggered { binding: index })
                        .await
                    {
                        warn!("failed to send binding trigger: {err}");
                        // If the engine channel is closed, there's no point
                        // keeping the watcher loop alive.
                        return;
                    }
                }
            }
        }

        debug!("file watcher loop ended");
    });

    Ok(WatcherHandle { _inner: watcher })
}
