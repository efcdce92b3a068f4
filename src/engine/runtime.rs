// src/engine/runtime.rs

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::engine::dispatch::DispatchTable;
use crate::run::{runner, RunResult};
use crate::server::ServerHandle;
use crate::watch::patterns::WatchBinding;
use crate::Orchestrator;

/// Events sent into the engine from the watcher, finished rebuilds, or
/// external signals.
#[derive(Debug)]
pub enum EngineEvent {
    /// A filesystem change matched a binding's patterns.
    BindingTriggered { binding: usize },
    /// A binding's rebuild reached a terminal state.
    RunFinished { binding: usize, result: RunResult },
    /// Ctrl-C or equivalent.
    ShutdownRequested,
}

/// The watch-session event loop.
///
/// Responsibilities:
/// - Consume [`EngineEvent`]s from the watcher and finished rebuilds.
/// - Drive the per-binding dispatch state machine (coalescing re-triggers).
/// - Spawn rebuilds as background tasks so event acceptance never blocks on
///   a running build.
/// - Reload the dev server after successful rebuilds only.
/// - Absorb rebuild failures: the session ends only on shutdown.
pub struct Engine {
    orch: Arc<Orchestrator>,
    bindings: Arc<Vec<WatchBinding>>,
    dispatch: DispatchTable,
    server: Option<ServerHandle>,

    events_rx: mpsc::Receiver<EngineEvent>,
    events_tx: mpsc::Sender<EngineEvent>,
}

impl Engine {
    pub fn new(
        orch: Arc<Orchestrator>,
        bindings: Arc<Vec<WatchBinding>>,
        server: Option<ServerHandle>,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::channel::<EngineEvent>(64);
        let dispatch = DispatchTable::new(bindings.len());
        Self {
            orch,
            bindings,
            dispatch,
            server,
            events_rx,
            events_tx,
        }
    }

    /// Sender for producers (watcher, signal handler).
    pub fn sender(&self) -> mpsc::Sender<EngineEvent> {
        self.events_tx.clone()
    }

    /// Main event loop; returns when shutdown is requested.
    pub async fn run(mut self) -> Result<()> {
        info!("watch session started");

        while let Some(event) = self.events_rx.recv().await {
            match event {
                EngineEvent::BindingTriggered { binding } => self.handle_trigger(binding),
                EngineEvent::RunFinished { binding, result } => {
                    self.handle_finished(binding, result)
                }
                EngineEvent::ShutdownRequested => {
                    info!("shutdown requested, stopping watch session");
                    break;
                }
            }
        }

        info!("watch session exiting");
        Ok(())
    }

    fn handle_trigger(&mut self, binding: usize) {
        let Some(bound) = self.bindings.get(binding) else {
            warn!(binding, "trigger for unknown binding; ignoring");
            return;
        };

        if self.dispatch.on_trigger(binding) {
            info!(binding = %bound.name(), "change detected, rebuilding");
            self.start_run(binding);
        } else {
            debug!(binding = %bound.name(), "change coalesced into pending re-run");
        }
    }

    fn handle_finished(&mut self, binding: usize, result: RunResult) {
        let name = self
            .bindings
            .get(binding)
            .map(|b| b.name().to_string())
            .unwrap_or_else(|| format!("#{binding}"));

        if result.is_success() {
            info!(binding = %name, "rebuild succeeded");
            if let Some(server) = &self.server {
                server.reload();
            }
        } else {
            // Already classified, notified and logged by the isolation
            // layer; the session stays alive for the next change.
            for failure in result.failures() {
                warn!(binding = %name, unit = %failure.unit, "rebuild failed: {}", failure.message);
            }
        }

        if self.dispatch.on_finished(binding) {
            info!(binding = %name, "running coalesced re-trigger");
            self.start_run(binding);
        }
    }

    /// Spawn the binding's action in the background and report back through
    /// the event channel.
    fn start_run(&self, binding: usize) {
        let Some(bound) = self.bindings.get(binding) else {
            return;
        };
        let unit = bound.action().clone();
        let orch = self.orch.clone();
        let events_tx = self.events_tx.clone();

        tokio::spawn(async move {
            let result = runner::run(orch, unit).await;
            if let Err(err) = events_tx
                .send(EngineEvent::RunFinished { binding, result })
                .await
            {
                warn!("failed to report finished run: {err}");
            }
        });
    }
}
