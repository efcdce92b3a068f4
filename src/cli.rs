// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, Subcommand, ValueEnum};

/// Command-line arguments for `buildwatch`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "buildwatch",
    version,
    about = "Build, serve and live-rebuild a static site pipeline.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Buildwatch.toml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value = "Buildwatch.toml")]
    pub config: String,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `BUILDWATCH_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print the task tree, but don't execute anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Without a subcommand: run the `default` task, then serve and watch.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// One-shot and long-running pipeline commands.
///
/// `clean`, `build` and `deploy` run the task of the same name from the
/// config and exit with a non-zero code on failure. `serve` and `watch` run
/// until interrupted.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Delete the output tree.
    Clean,
    /// Run every compile task once.
    Build,
    /// Serve the output tree over HTTP without watching.
    Serve,
    /// Watch sources and rebuild on change (no server).
    Watch,
    /// Run the configured deploy task.
    Deploy,
    /// Run a single named task once.
    Run {
        /// Task name as declared in the config.
        task: String,
    },
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
