// src/watch/patterns.rs

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::config::model::ConfigFile;
use crate::errors::{BuildwatchError, Result};
use crate::task::Unit;

/// One watch binding: compiled change patterns paired with a rebuild action.
///
/// Patterns are an explicit list of root directories plus glob suffixes; the
/// roots are resolved and checked for readability when the binding is built,
/// and globs are matched against paths relative to their root.
#[derive(Clone)]
pub struct WatchBinding {
    name: String,
    roots: Vec<PathBuf>,
    globs: GlobSet,
    action: Unit,
}

impl fmt::Debug for WatchBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchBinding")
            .field("name", &self.name)
            .field("roots", &self.roots)
            .finish_non_exhaustive()
    }
}

impl WatchBinding {
    /// Build a binding, canonicalizing roots and failing fast on any root
    /// that does not exist or cannot be read.
    pub fn new(
        name: impl Into<String>,
        roots: &[impl AsRef<Path>],
        globs: &[String],
        action: Unit,
    ) -> Result<Self> {
        let name = name.into();

        let mut resolved = Vec::with_capacity(roots.len());
        for root in roots {
            let root = root.as_ref();
            // read_dir doubles as the readability probe.
            fs::read_dir(root).map_err(|err| {
                BuildwatchError::WatchSetup(format!(
                    "binding '{}': watch root {:?} is not readable: {}",
                    name, root, err
                ))
            })?;
            let canonical = root.canonicalize().map_err(|err| {
                BuildwatchError::WatchSetup(format!(
                    "binding '{}': cannot resolve watch root {:?}: {}",
                    name, root, err
                ))
            })?;
            resolved.push(canonical);
        }

        let mut builder = GlobSetBuilder::new();
        for pattern in globs {
            let glob = Glob::new(pattern).map_err(|err| {
                BuildwatchError::WatchSetup(format!(
                    "binding '{}': invalid glob pattern '{}': {}",
                    name, pattern, err
                ))
            })?;
            builder.add(glob);
        }
        let globs = builder
            .build()
            .map_err(|err| BuildwatchError::WatchSetup(err.to_string()))?;

        Ok(Self {
            name,
            roots: resolved,
            globs,
            action,
        })
    }

    /// Name of the owning task.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resolved watch roots.
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// The rebuild action triggered by a matching change.
    pub fn action(&self) -> &Unit {
        &self.action
    }

    /// True if the (absolute) changed path lies under one of the binding's
    /// roots and its root-relative form matches the glob set.
    pub fn matches_path(&self, path: &Path) -> bool {
        for root in &self.roots {
            if let Ok(rel) = path.strip_prefix(root) {
                let rel = rel.to_string_lossy().replace('\\', "/");
                if self.globs.is_match(&rel) {
                    return true;
                }
            }
        }
        false
    }
}

/// Build the watch bindings declared in the config: one per task with a
/// `watch` section, with that task as the bound action.
pub fn build_bindings(cfg: &ConfigFile) -> Result<Vec<WatchBinding>> {
    let mut bindings = Vec::new();

    for (name, task) in cfg.task.iter() {
        let Some(watch) = &task.watch else {
            continue;
        };
        bindings.push(WatchBinding::new(
            name.clone(),
            &watch.roots,
            &watch.globs,
            Unit::task(name.as_str()),
        )?);
    }

    Ok(bindings)
}
