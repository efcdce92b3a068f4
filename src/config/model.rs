// src/config/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [project]
/// source = "project"
/// output = "dist"
///
/// [server]
/// port = 8080
///
/// [task.styles]
/// cmd = "sass project/main.scss dist/css/main.css"
/// watch = { roots = ["project"], globs = ["**/*.scss"] }
///
/// [task.build]
/// parallel = ["templates", "styles"]
///
/// [task.default]
/// series = ["clean", "build"]
/// ```
///
/// All sections are optional and have reasonable defaults except `[task.*]`,
/// which must declare at least one task.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ConfigFile {
    /// Source/output directories from `[project]`.
    #[serde(default)]
    pub project: ProjectSection,

    /// Dev server settings from `[server]`.
    #[serde(default)]
    pub server: ServerSection,

    /// All tasks from `[task.<name>]`.
    ///
    /// Keys are the task names (e.g. `"styles"`, `"build"`, `"default"`).
    #[serde(default)]
    pub task: BTreeMap<String, TaskConfig>,
}

/// `[project]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectSection {
    /// Directory holding the pipeline sources.
    #[serde(default = "default_source_dir")]
    pub source: String,

    /// Directory the pipeline writes artifacts into.
    #[serde(default = "default_output_dir")]
    pub output: String,
}

fn default_source_dir() -> String {
    "project".to_string()
}

fn default_output_dir() -> String {
    "dist".to_string()
}

impl Default for ProjectSection {
    fn default() -> Self {
        Self {
            source: default_source_dir(),
            output: default_output_dir(),
        }
    }
}

/// `[server]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSection {
    /// HTTP port for the dev server.
    #[serde(default = "default_server_port")]
    pub port: u16,
}

fn default_server_port() -> u16 {
    8080
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            port: default_server_port(),
        }
    }
}

/// `[task.<name>]` section.
///
/// Each task declares exactly one body:
///
/// - `cmd` — run an external transform command (template renderer, style
///   compiler, script bundler, ...).
/// - `copy` — copy matching files into the output tree.
/// - `clean` — delete a subtree of the output directory (`"."` for all of it).
/// - `series` / `parallel` — compose other tasks by name.
///
/// `needs` lists prerequisite tasks that run (in order, fail-fast) before the
/// body. `watch` binds filesystem change patterns to this task for watch mode.
///
/// Tasks inside one `parallel` group must write disjoint output subtrees;
/// this is a caller obligation, not something buildwatch checks at runtime.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct TaskConfig {
    /// External command body, executed through the platform shell.
    #[serde(default)]
    pub cmd: Option<String>,

    /// Asset-copy body.
    #[serde(default)]
    pub copy: Option<CopyConfig>,

    /// Clean body: output subtree to delete, `"."` for the whole output dir.
    #[serde(default)]
    pub clean: Option<String>,

    /// Series composite body: member task names, run in order, fail-fast.
    #[serde(default)]
    pub series: Option<Vec<String>>,

    /// Parallel composite body: member task names, run concurrently; siblings
    /// always run to completion even when one of them fails.
    #[serde(default)]
    pub parallel: Option<Vec<String>>,

    /// Prerequisite tasks, run as a leading series before the body.
    #[serde(default)]
    pub needs: Vec<String>,

    /// Watch binding: changes under `roots` matching `globs` re-run this task.
    #[serde(default)]
    pub watch: Option<WatchConfig>,
}

impl TaskConfig {
    /// Number of body fields set on this task. Valid configs have exactly one.
    pub fn body_count(&self) -> usize {
        [
            self.cmd.is_some(),
            self.copy.is_some(),
            self.clean.is_some(),
            self.series.is_some(),
            self.parallel.is_some(),
        ]
        .iter()
        .filter(|set| **set)
        .count()
    }

    /// All task names this task references (composite members + needs).
    pub fn references(&self) -> impl Iterator<Item = &str> {
        self.series
            .iter()
            .flatten()
            .chain(self.parallel.iter().flatten())
            .chain(self.needs.iter())
            .map(String::as_str)
    }
}

/// Closed option set for the asset-copy transform.
#[derive(Debug, Clone, Deserialize)]
pub struct CopyConfig {
    /// Root directory to copy from.
    pub from: String,

    /// Glob patterns (relative to `from`) selecting files to copy.
    #[serde(default = "default_copy_globs")]
    pub globs: Vec<String>,

    /// Subdirectory of the output dir to copy into; output root if absent.
    #[serde(default)]
    pub into: Option<String>,

    /// Drop intermediate directories and copy files by name only.
    #[serde(default)]
    pub flatten: bool,

    /// Skip files whose existing artifact is at least as new as the source.
    #[serde(default = "default_true")]
    pub only_changed: bool,
}

fn default_copy_globs() -> Vec<String> {
    vec!["**/*".to_string()]
}

fn default_true() -> bool {
    true
}

/// Watch binding: an explicit list of root directories plus glob suffixes.
///
/// Roots are resolved and checked for readability once at startup; globs are
/// matched against paths relative to their root.
#[derive(Debug, Clone, Deserialize)]
pub struct WatchConfig {
    /// Directories to watch recursively. Must exist and be readable.
    pub roots: Vec<String>,

    /// Glob patterns relative to each root.
    #[serde(default = "default_watch_globs")]
    pub globs: Vec<String>,
}

fn default_watch_globs() -> Vec<String> {
    vec!["**/*".to_string()]
}
