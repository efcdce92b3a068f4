// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod logging;
pub mod notifier;
pub mod run;
pub mod server;
pub mod task;
pub mod transform;
pub mod watch;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Result};
use tracing::{debug, info};

use crate::cli::{CliArgs, Command};
use crate::config::loader::load_and_validate;
use crate::config::model::ConfigFile;
use crate::engine::{Engine, EngineEvent};
use crate::notifier::{DesktopNotifier, Notifier};
use crate::run::{runner, RunResult};
use crate::server::{ServerHandle, ServerOptions};
use crate::task::{TaskRegistry, Unit};
use crate::transform::InvokeContext;
use crate::watch::build_bindings;

/// Explicit orchestrator context: config, task registry and notification
/// channel, created once at startup and passed to every component.
pub struct Orchestrator {
    pub config: ConfigFile,
    pub registry: TaskRegistry,
    pub notifier: Arc<dyn Notifier>,
}

impl Orchestrator {
    /// Build the context from a validated config, registering every
    /// configured task.
    pub fn new(config: ConfigFile, notifier: Arc<dyn Notifier>) -> errors::Result<Self> {
        let registry = TaskRegistry::from_config(&config)?;
        Ok(Self {
            config,
            registry,
            notifier,
        })
    }

    /// Directories handed to every transform invocation.
    pub fn invoke_context(&self) -> InvokeContext {
        InvokeContext {
            source_dir: self.source_dir(),
            output_dir: self.output_dir(),
        }
    }

    pub fn source_dir(&self) -> PathBuf {
        PathBuf::from(&self.config.project.source)
    }

    pub fn output_dir(&self) -> PathBuf {
        PathBuf::from(&self.config.project.output)
    }
}

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading and validation
/// - the task registry
/// - one-shot task runs (`clean`, `build`, `deploy`, `run <task>`)
/// - the dev server and watch session for `serve`, `watch` and the default
///   command
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let cfg = load_and_validate(&config_path)?;

    if args.dry_run {
        print_dry_run(&cfg);
        return Ok(());
    }

    let orch = Arc::new(Orchestrator::new(cfg, Arc::new(DesktopNotifier))?);

    match args.command {
        Some(Command::Clean) => run_one_shot(&orch, "clean").await,
        Some(Command::Build) => run_one_shot(&orch, "build").await,
        Some(Command::Deploy) => run_one_shot(&orch, "deploy").await,
        Some(Command::Run { task }) => run_one_shot(&orch, &task).await,
        Some(Command::Serve) => {
            let _server = start_server(&orch)?;
            wait_for_shutdown().await
        }
        Some(Command::Watch) => watch_session(orch, None).await,
        None => {
            // Default: full pipeline, then serve + watch with live reload.
            run_one_shot(&orch, "default").await?;
            let server = start_server(&orch)?;
            watch_session(orch, Some(server)).await
        }
    }
}

/// Run a single named task to completion; a failure makes the command fail
/// with a non-zero exit (partially written output is left as-is).
async fn run_one_shot(orch: &Arc<Orchestrator>, name: &str) -> Result<()> {
    // Unknown names are registry misuse and fatal before anything runs.
    orch.registry.lookup(name)?;

    info!(task = %name, "running task");
    let result = runner::run(orch.clone(), Unit::task(name)).await;

    match result {
        RunResult::Success => {
            info!(task = %name, "task completed");
            Ok(())
        }
        RunResult::Failure(failures) => {
            let units: Vec<&str> = failures.iter().map(|f| f.unit.as_str()).collect();
            bail!("task '{}' failed (failing units: {})", name, units.join(", "));
        }
    }
}

fn start_server(orch: &Arc<Orchestrator>) -> Result<ServerHandle> {
    let options = ServerOptions {
        port: orch.config.server.port,
    };
    server::start(orch.output_dir(), &options)
}

/// Run the reactive rebuild loop until shutdown. Transform failures inside
/// the session are absorbed; only watch setup errors abort.
async fn watch_session(orch: Arc<Orchestrator>, server: Option<ServerHandle>) -> Result<()> {
    let bindings = Arc::new(build_bindings(&orch.config)?);
    if bindings.is_empty() {
        bail!("no watch bindings configured; add `watch = {{ roots = [...] }}` to a task");
    }

    let engine = Engine::new(orch, bindings.clone(), server);
    let engine_tx = engine.sender();

    let _watcher = watch::spawn_watcher(bindings, engine_tx.clone())?;

    // Ctrl-C -> graceful shutdown.
    tokio::spawn(async move {
        if let Err(err) = tokio::signal::ctrl_c().await {
            eprintln!("failed to listen for Ctrl+C: {err}");
            return;
        }
        let _ = engine_tx.send(EngineEvent::ShutdownRequested).await;
    });

    engine.run().await
}

async fn wait_for_shutdown() -> Result<()> {
    tokio::signal::ctrl_c().await?;
    info!("shutting down");
    Ok(())
}

/// Simple dry-run output: print tasks, bodies and watch bindings.
fn print_dry_run(cfg: &ConfigFile) {
    println!("buildwatch dry-run");
    println!("  project.source = {}", cfg.project.source);
    println!("  project.output = {}", cfg.project.output);
    println!("  server.port = {}", cfg.server.port);
    println!();

    println!("tasks ({}):", cfg.task.len());
    for (name, task) in cfg.task.iter() {
        println!("  - {name}");
        if let Some(cmd) = &task.cmd {
            println!("      cmd: {cmd}");
        }
        if let Some(copy) = &task.copy {
            println!("      copy: {} {:?}", copy.from, copy.globs);
        }
        if let Some(sub) = &task.clean {
            println!("      clean: {sub}");
        }
        if let Some(members) = &task.series {
            println!("      series: {members:?}");
        }
        if let Some(members) = &task.parallel {
            println!("      parallel: {members:?}");
        }
        if !task.needs.is_empty() {
            println!("      needs: {:?}", task.needs);
        }
        if let Some(watch) = &task.watch {
            println!("      watch: {:?} {:?}", watch.roots, watch.globs);
        }
    }

    debug!("dry-run complete (no execution)");
}
