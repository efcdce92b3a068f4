// src/config/validate.rs

use globset::Glob;
use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::config::model::ConfigFile;
use crate::errors::{BuildwatchError, Result};

/// Run semantic validation against a loaded configuration.
///
/// This checks:
/// - there is at least one task
/// - every task declares exactly one body (`cmd` / `copy` / `clean` /
///   `series` / `parallel`)
/// - `clean` bodies stay inside the output directory
/// - all referenced task names (`series`, `parallel`, `needs`) exist and are
///   not self-references
/// - the task reference graph has no cycles
/// - all copy and watch glob patterns compile
///
/// It does **not** touch the filesystem; watch roots are resolved and checked
/// for readability when the watch session is set up.
pub fn validate_config(cfg: &ConfigFile) -> Result<()> {
    ensure_has_tasks(cfg)?;
    validate_bodies(cfg)?;
    validate_references(cfg)?;
    validate_reference_graph(cfg)?;
    validate_globs(cfg)?;
    Ok(())
}

fn ensure_has_tasks(cfg: &ConfigFile) -> Result<()> {
    if cfg.task.is_empty() {
        return Err(BuildwatchError::Config(
            "config must contain at least one [task.<name>] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_bodies(cfg: &ConfigFile) -> Result<()> {
    for (name, task) in cfg.task.iter() {
        match task.body_count() {
            1 => {}
            0 => {
                return Err(BuildwatchError::Config(format!(
                    "task '{name}' declares no body; set one of cmd, copy, clean, series, parallel"
                )));
            }
            n => {
                return Err(BuildwatchError::Config(format!(
                    "task '{name}' declares {n} bodies; exactly one of cmd, copy, clean, series, parallel is allowed"
                )));
            }
        }

        if let Some(sub) = &task.clean {
            let escapes = std::path::Path::new(sub)
                .components()
                .any(|c| matches!(c, std::path::Component::ParentDir | std::path::Component::RootDir));
            if escapes {
                return Err(BuildwatchError::Config(format!(
                    "task '{name}' clean path '{sub}' must stay inside the output directory"
                )));
            }
        }

        if let Some(watch) = &task.watch {
            if watch.roots.is_empty() {
                return Err(BuildwatchError::Config(format!(
                    "task '{name}' declares a watch binding with no roots"
                )));
            }
        }
    }
    Ok(())
}

fn validate_references(cfg: &ConfigFile) -> Result<()> {
    for (name, task) in cfg.task.iter() {
        for reference in task.references() {
            if !cfg.task.contains_key(reference) {
                return Err(BuildwatchError::Config(format!(
                    "task '{name}' references unknown task '{reference}'"
                )));
            }
            if reference == name {
                return Err(BuildwatchError::Config(format!(
                    "task '{name}' cannot reference itself"
                )));
            }
        }
    }
    Ok(())
}

fn validate_reference_graph(cfg: &ConfigFile) -> Result<()> {
    // Edge direction: referenced -> referencing, so a toposort failure names
    // a task involved in a composite/needs cycle.
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

    for name in cfg.task.keys() {
        graph.add_node(name.as_str());
    }

    for (name, task) in cfg.task.iter() {
        for reference in task.references() {
            graph.add_edge(reference, name.as_str(), ());
        }
    }

    match toposort(&graph, None) {
        Ok(_order) => Ok(()),
        Err(cycle) => {
            let node = cycle.node_id();
            Err(BuildwatchError::Config(format!(
                "cycle detected in task references involving task '{node}'"
            )))
        }
    }
}

fn validate_globs(cfg: &ConfigFile) -> Result<()> {
    for (name, task) in cfg.task.iter() {
        let mut patterns: Vec<&str> = Vec::new();
        if let Some(copy) = &task.copy {
            patterns.extend(copy.globs.iter().map(String::as_str));
        }
        if let Some(watch) = &task.watch {
            patterns.extend(watch.globs.iter().map(String::as_str));
        }

        for pattern in patterns {
            Glob::new(pattern).map_err(|err| {
                BuildwatchError::Config(format!(
                    "task '{name}' has invalid glob pattern '{pattern}': {err}"
                ))
            })?;
        }
    }
    Ok(())
}
