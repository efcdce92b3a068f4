// src/transform/command.rs

use std::process::{Command, Stdio};

use anyhow::{bail, Context};
use tracing::{debug, info};

use crate::transform::{InvokeContext, TransformUnit};

/// Transform unit that runs an external command through the platform shell.
///
/// This is how the actual toolchains (template renderer, style compiler,
/// script bundler) plug into the pipeline. The child's output is captured in
/// full rather than streamed, so a command that dies mid-output ends
/// gracefully instead of wedging a pipe.
///
/// The command runs with the project directory as working directory and the
/// source/output directories exposed as `BUILDWATCH_SOURCE` and
/// `BUILDWATCH_OUTPUT`.
pub struct CommandTransform {
    id: String,
    cmd: String,
}

impl CommandTransform {
    pub fn new(id: impl Into<String>, cmd: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            cmd: cmd.into(),
        }
    }
}

impl TransformUnit for CommandTransform {
    fn id(&self) -> &str {
        &self.id
    }

    fn invoke(&self, ctx: &InvokeContext) -> anyhow::Result<()> {
        info!(unit = %self.id, cmd = %self.cmd, "running transform command");

        let mut cmd = if cfg!(windows) {
            let mut c = Command::new("cmd");
            c.arg("/C").arg(&self.cmd);
            c
        } else {
            let mut c = Command::new("sh");
            c.arg("-c").arg(&self.cmd);
            c
        };

        let output = cmd
            .env("BUILDWATCH_SOURCE", &ctx.source_dir)
            .env("BUILDWATCH_OUTPUT", &ctx.output_dir)
            .stdin(Stdio::null())
            .output()
            .with_context(|| format!("spawning command for unit '{}'", self.id))?;

        for line in String::from_utf8_lossy(&output.stdout).lines() {
            debug!(unit = %self.id, "stdout: {line}");
        }

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stderr = stderr.trim();
            if stderr.is_empty() {
                bail!("command exited with code {code}");
            }
            bail!("command exited with code {code}: {stderr}");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn ctx() -> InvokeContext {
        InvokeContext {
            source_dir: PathBuf::from("."),
            output_dir: PathBuf::from("."),
        }
    }

    #[test]
    #[cfg(unix)]
    fn successful_command_is_ok() {
        let unit = CommandTransform::new("ok", "true");
        unit.invoke(&ctx()).unwrap();
    }

    #[test]
    #[cfg(unix)]
    fn failing_command_reports_stderr() {
        let unit = CommandTransform::new("boom", "echo nope >&2; exit 3");
        let err = unit.invoke(&ctx()).unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("code 3"), "message was: {msg}");
        assert!(msg.contains("nope"), "message was: {msg}");
    }
}
