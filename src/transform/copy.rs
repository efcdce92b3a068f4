// src/transform/copy.rs

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use tracing::{debug, info};

use crate::config::model::CopyConfig;
use crate::transform::{InvokeContext, TransformUnit};

/// Transform unit that copies files matching glob patterns into the output
/// tree.
///
/// Options (all validated at registration time):
/// - `into`: output subdirectory to copy under (output root if unset)
/// - `flatten`: drop intermediate directories, copying by file name only
/// - `only_changed`: skip files whose existing artifact is at least as new
///   as the source
pub struct CopyAssets {
    id: String,
    from: PathBuf,
    globs: GlobSet,
    into: Option<String>,
    flatten: bool,
    only_changed: bool,
}

impl CopyAssets {
    /// Build a copy unit from its config section, compiling the glob set.
    pub fn from_config(id: impl Into<String>, cfg: &CopyConfig) -> crate::errors::Result<Self> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &cfg.globs {
            let glob = Glob::new(pattern).map_err(|err| {
                crate::errors::BuildwatchError::Config(format!(
                    "invalid copy glob '{pattern}': {err}"
                ))
            })?;
            builder.add(glob);
        }
        let globs = builder
            .build()
            .map_err(|err| crate::errors::BuildwatchError::Config(err.to_string()))?;

        Ok(Self {
            id: id.into(),
            from: PathBuf::from(&cfg.from),
            globs,
            into: cfg.into.clone(),
            flatten: cfg.flatten,
            only_changed: cfg.only_changed,
        })
    }

    fn dest_root(&self, ctx: &InvokeContext) -> PathBuf {
        match &self.into {
            Some(sub) => ctx.output_dir.join(sub),
            None => ctx.output_dir.clone(),
        }
    }

    fn dest_for(&self, dest_root: &Path, rel: &Path) -> PathBuf {
        if self.flatten {
            match rel.file_name() {
                Some(name) => dest_root.join(name),
                None => dest_root.join(rel),
            }
        } else {
            dest_root.join(rel)
        }
    }

    fn copy_one(&self, src: &Path, dest: &Path) -> Result<bool> {
        if self.only_changed && !is_newer_than(src, dest)? {
            debug!(unit = %self.id, src = %src.display(), "unchanged, skipping");
            return Ok(false);
        }

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating directory {:?}", parent))?;
        }
        fs::copy(src, dest)
            .with_context(|| format!("copying {:?} to {:?}", src, dest))?;
        Ok(true)
    }
}

impl TransformUnit for CopyAssets {
    fn id(&self) -> &str {
        &self.id
    }

    fn invoke(&self, ctx: &InvokeContext) -> anyhow::Result<()> {
        let dest_root = self.dest_root(ctx);

        let mut files = Vec::new();
        collect_files(&self.from, &self.from, &mut files)
            .with_context(|| format!("reading copy source {:?}", self.from))?;

        let mut copied = 0usize;
        for rel in files {
            if !self.globs.is_match(&rel) {
                continue;
            }
            let src = self.from.join(&rel);
            let dest = self.dest_for(&dest_root, &rel);
            if self.copy_one(&src, &dest)? {
                copied += 1;
            }
        }

        info!(unit = %self.id, copied, dest = %dest_root.display(), "assets copied");
        Ok(())
    }
}

/// Recursively collect file paths relative to `base`.
fn collect_files(base: &Path, dir: &Path, out: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            collect_files(base, &path, out)?;
        } else if let Ok(rel) = path.strip_prefix(base) {
            out.push(rel.to_path_buf());
        }
    }
    Ok(())
}

/// True if `dest` is missing or strictly older than `src`.
fn is_newer_than(src: &Path, dest: &Path) -> std::io::Result<bool> {
    let dest_meta = match fs::metadata(dest) {
        Ok(meta) => meta,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(true),
        Err(err) => return Err(err),
    };

    let src_modified = fs::metadata(src)?.modified()?;
    let dest_modified = dest_meta.modified()?;
    Ok(src_modified > dest_modified)
}
