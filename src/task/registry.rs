// src/task/registry.rs

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::config::model::ConfigFile;
use crate::errors::{BuildwatchError, Result};
use crate::task::compose::{parallel, series, Unit};
use crate::transform::clean::CleanDir;
use crate::transform::command::CommandTransform;
use crate::transform::copy::CopyAssets;
use crate::transform::TransformUnit;

/// What a registered task actually does.
#[derive(Clone)]
pub enum BodyKind {
    /// Invoke a single transform unit (through the error isolation layer).
    Transform(Arc<dyn TransformUnit>),
    /// Run a nested composition of other tasks.
    Composite(Unit),
}

impl std::fmt::Debug for BodyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BodyKind::Transform(unit) => f.debug_tuple("Transform").field(&unit.id()).finish(),
            BodyKind::Composite(unit) => f.debug_tuple("Composite").field(unit).finish(),
        }
    }
}

/// Executable body of a registered task.
///
/// `needs` lists prerequisite task names that the runner executes as a
/// leading, fail-fast series before the body itself.
#[derive(Debug, Clone)]
pub struct TaskBody {
    pub needs: Vec<String>,
    pub kind: BodyKind,
}

impl TaskBody {
    pub fn transform(unit: Arc<dyn TransformUnit>) -> Self {
        Self {
            needs: Vec::new(),
            kind: BodyKind::Transform(unit),
        }
    }

    pub fn composite(unit: Unit) -> Self {
        Self {
            needs: Vec::new(),
            kind: BodyKind::Composite(unit),
        }
    }

    pub fn with_needs(mut self, needs: Vec<String>) -> Self {
        self.needs = needs;
        self
    }
}

/// Name-keyed map of task bodies.
///
/// Names are unique and immutable once registered; tasks are registered once
/// at startup and looked up any number of times afterwards.
#[derive(Debug, Default)]
pub struct TaskRegistry {
    tasks: HashMap<String, Arc<TaskBody>>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a task body under a unique name.
    ///
    /// Redefinition is an error; the first registration wins and the registry
    /// is left unchanged.
    pub fn register(&mut self, name: impl Into<String>, body: TaskBody) -> Result<()> {
        let name = name.into();
        if self.tasks.contains_key(&name) {
            return Err(BuildwatchError::DuplicateTask(name));
        }
        debug!(task = %name, body = ?body.kind, "registered task");
        self.tasks.insert(name, Arc::new(body));
        Ok(())
    }

    /// Look up a task body by name.
    pub fn lookup(&self, name: &str) -> Result<Arc<TaskBody>> {
        self.tasks
            .get(name)
            .cloned()
            .ok_or_else(|| BuildwatchError::UnknownTask(name.to_string()))
    }

    /// All registered task names, unordered.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tasks.keys().map(String::as_str)
    }

    /// Build a registry from a validated [`ConfigFile`].
    ///
    /// Assumes `validate_config` has passed: every task has exactly one body
    /// and all references resolve.
    pub fn from_config(cfg: &ConfigFile) -> Result<Self> {
        let mut registry = Self::new();

        for (name, task) in cfg.task.iter() {
            let kind = if let Some(cmd) = &task.cmd {
                BodyKind::Transform(Arc::new(CommandTransform::new(name.as_str(), cmd.as_str())))
            } else if let Some(copy) = &task.copy {
                BodyKind::Transform(Arc::new(CopyAssets::from_config(name.as_str(), copy)?))
            } else if let Some(subpath) = &task.clean {
                BodyKind::Transform(Arc::new(CleanDir::new(name.as_str(), subpath.as_str())))
            } else if let Some(members) = &task.series {
                BodyKind::Composite(series(members.iter().map(|m| Unit::task(m.as_str()))))
            } else if let Some(members) = &task.parallel {
                BodyKind::Composite(parallel(members.iter().map(|m| Unit::task(m.as_str()))))
            } else {
                return Err(BuildwatchError::Config(format!(
                    "task '{name}' has no body"
                )));
            };

            let body = TaskBody {
                needs: task.needs.clone(),
                kind,
            };
            registry.register(name.clone(), body)?;
        }

        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::BuildwatchError;

    #[test]
    fn duplicate_registration_is_an_error() {
        let mut registry = TaskRegistry::new();
        registry
            .register("clean", TaskBody::composite(series([])))
            .unwrap();

        let err = registry
            .register("clean", TaskBody::composite(series([])))
            .unwrap_err();
        assert!(matches!(err, BuildwatchError::DuplicateTask(name) if name == "clean"));
    }

    #[test]
    fn lookup_of_missing_task_is_an_error() {
        let registry = TaskRegistry::new();
        let err = registry.lookup("nope").unwrap_err();
        assert!(matches!(err, BuildwatchError::UnknownTask(name) if name == "nope"));
    }
}
