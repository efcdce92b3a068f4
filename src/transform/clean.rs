// src/transform/clean.rs

use std::fs;
use std::path::Path;

use anyhow::{bail, Context};
use tracing::info;

use crate::transform::{InvokeContext, TransformUnit};

/// Control action that deletes an output subtree.
///
/// `subpath` is relative to the output directory; `"."` (or `""`) removes the
/// whole output tree. A missing target is a success: the postcondition is
/// "the subtree is absent", not "something was deleted".
pub struct CleanDir {
    id: String,
    subpath: String,
}

impl CleanDir {
    pub fn new(id: impl Into<String>, subpath: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            subpath: subpath.into(),
        }
    }

    fn target(&self, ctx: &InvokeContext) -> anyhow::Result<std::path::PathBuf> {
        let sub = Path::new(&self.subpath);
        // Config validation rejects escaping paths; re-check here since this
        // unit deletes trees.
        if sub
            .components()
            .any(|c| matches!(c, std::path::Component::ParentDir | std::path::Component::RootDir))
        {
            bail!("clean path '{}' escapes the output directory", self.subpath);
        }
        if self.subpath.is_empty() || self.subpath == "." {
            Ok(ctx.output_dir.clone())
        } else {
            Ok(ctx.output_dir.join(sub))
        }
    }
}

impl TransformUnit for CleanDir {
    fn id(&self) -> &str {
        &self.id
    }

    fn invoke(&self, ctx: &InvokeContext) -> anyhow::Result<()> {
        let target = self.target(ctx)?;

        match fs::remove_dir_all(&target) {
            Ok(()) => {
                info!(unit = %self.id, target = %target.display(), "cleaned");
                Ok(())
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                info!(unit = %self.id, target = %target.display(), "already clean");
                Ok(())
            }
            Err(err) => Err(err).with_context(|| format!("removing {:?}", target)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn ctx(output: &Path) -> InvokeContext {
        InvokeContext {
            source_dir: PathBuf::from("."),
            output_dir: output.to_path_buf(),
        }
    }

    #[test]
    fn removes_the_whole_output_tree() {
        let out = tempdir().unwrap();
        let dist = out.path().join("dist");
        fs::create_dir_all(dist.join("css")).unwrap();
        fs::write(dist.join("css/old.css"), "stale").unwrap();

        CleanDir::new("clean", ".").invoke(&ctx(&dist)).unwrap();
        assert!(!dist.exists());
    }

    #[test]
    fn removes_only_the_named_subtree() {
        let out = tempdir().unwrap();
        fs::create_dir_all(out.path().join("js")).unwrap();
        fs::create_dir_all(out.path().join("css")).unwrap();
        fs::write(out.path().join("js/bundle.js"), "stale").unwrap();

        CleanDir::new("clean_js", "js")
            .invoke(&ctx(out.path()))
            .unwrap();
        assert!(!out.path().join("js").exists());
        assert!(out.path().join("css").exists());
    }

    #[test]
    fn missing_target_is_a_success() {
        let out = tempdir().unwrap();
        CleanDir::new("clean", "nothing/here")
            .invoke(&ctx(out.path()))
            .unwrap();
    }

    #[test]
    fn escaping_path_is_a_failure() {
        let out = tempdir().unwrap();
        let err = CleanDir::new("clean", "../oops")
            .invoke(&ctx(out.path()))
            .unwrap_err();
        assert!(format!("{err:#}").contains("escapes"));
    }
}
