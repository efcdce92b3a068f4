// src/notifier.rs

//! Best-effort user notifications.
//!
//! Failures must be visible without staring at the terminal, so the error
//! isolation layer pushes a short desktop notification per failed transform.
//! The channel itself is fire-and-forget: a broken notifier is logged at
//! debug level and never fails a build.

use std::process::{Command, Stdio};

use tracing::{debug, warn};

/// Fire-and-forget notification channel.
pub trait Notifier: Send + Sync {
    fn notify(&self, title: &str, message: &str);
}

/// Desktop notifications via the platform's native mechanism:
/// `osascript` on macOS, `notify-send` elsewhere.
pub struct DesktopNotifier;

impl Notifier for DesktopNotifier {
    fn notify(&self, title: &str, message: &str) {
        let spawned = if cfg!(target_os = "macos") {
            let script = format!(
                "display notification \"{}\" with title \"{}\"",
                escape_osascript(message),
                escape_osascript(title),
            );
            Command::new("osascript")
                .arg("-e")
                .arg(script)
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .spawn()
        } else {
            Command::new("notify-send")
                .arg(title)
                .arg(message)
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .spawn()
        };

        if let Err(err) = spawned {
            debug!("desktop notification unavailable: {err}");
        }
    }
}

/// Fallback notifier that only writes to the operator log. Used in tests and
/// headless environments.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, title: &str, message: &str) {
        warn!("{title}: {message}");
    }
}

fn escape_osascript(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
