// src/errors.rs

//! Crate-wide error taxonomy.
//!
//! Registry and setup errors are fatal for the command that hit them;
//! transform failures are *not* represented here because they are absorbed
//! into [`crate::run::RunResult`] values rather than propagated as errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuildwatchError {
    #[error("task '{0}' is already registered")]
    DuplicateTask(String),

    #[error("unknown task '{0}'")]
    UnknownTask(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("watch setup failed: {0}")]
    WatchSetup(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, BuildwatchError>;
