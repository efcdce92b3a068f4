use std::collections::BTreeMap;
use std::error::Error;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use buildwatch::config::{ConfigFile, CopyConfig, TaskConfig};
use buildwatch::notifier::LogNotifier;
use buildwatch::run::runner;
use buildwatch::task::Unit;
use buildwatch::Orchestrator;
use tempfile::tempdir;

type TestResult = Result<(), Box<dyn Error>>;

fn copy_task(from: &Path, into: &str) -> TaskConfig {
    TaskConfig {
        copy: Some(CopyConfig {
            from: from.to_string_lossy().into_owned(),
            globs: vec!["**/*".to_string()],
            into: Some(into.to_string()),
            flatten: false,
            only_changed: true,
        }),
        ..TaskConfig::default()
    }
}

/// clean + build = parallel(compile_a, compile_b); default = series(clean, build).
fn pipeline_config(src_a: &Path, src_b: &Path, output: &Path) -> ConfigFile {
    let mut tasks = BTreeMap::new();

    tasks.insert(
        "clean".to_string(),
        TaskConfig {
            clean: Some(".".to_string()),
            ..TaskConfig::default()
        },
    );
    tasks.insert("compile_a".to_string(), copy_task(src_a, "a"));
    tasks.insert("compile_b".to_string(), copy_task(src_b, "b"));
    tasks.insert(
        "build".to_string(),
        TaskConfig {
            parallel: Some(vec!["compile_a".to_string(), "compile_b".to_string()]),
            ..TaskConfig::default()
        },
    );
    tasks.insert(
        "default".to_string(),
        TaskConfig {
            series: Some(vec!["clean".to_string(), "build".to_string()]),
            ..TaskConfig::default()
        },
    );

    let mut cfg = ConfigFile::default();
    cfg.project.output = output.to_string_lossy().into_owned();
    cfg.task = tasks;
    cfg
}

/// Sorted (relative path, contents) snapshot of a directory tree.
fn snapshot(root: &Path) -> Vec<(String, Vec<u8>)> {
    fn walk(base: &Path, dir: &Path, out: &mut Vec<(String, Vec<u8>)>) {
        for entry in fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                walk(base, &path, out);
            } else {
                let rel = path.strip_prefix(base).unwrap();
                let rel = rel.to_string_lossy().replace('\\', "/");
                out.push((rel, fs::read(&path).unwrap()));
            }
        }
    }

    let mut out = Vec::new();
    walk(root, root, &mut out);
    out.sort();
    out
}

#[tokio::test]
async fn default_pipeline_replaces_stale_output_with_compiled_artifacts() -> TestResult {
    let workspace = tempdir()?;
    let src_a = workspace.path().join("src_a");
    let src_b = workspace.path().join("src_b");
    let output = workspace.path().join("dist");

    fs::create_dir_all(&src_a)?;
    fs::create_dir_all(&src_b)?;
    fs::write(src_a.join("index.html"), "<h1>a</h1>")?;
    fs::write(src_b.join("main.css"), "body{}")?;

    // Pre-existing unrelated artifacts from an earlier run.
    fs::create_dir_all(output.join("old"))?;
    fs::write(output.join("old/stale.js"), "stale")?;

    let cfg = pipeline_config(&src_a, &src_b, &output);
    let orch = Arc::new(Orchestrator::new(cfg, Arc::new(LogNotifier))?);

    let result = runner::run(orch, Unit::task("default")).await;
    assert!(result.is_success(), "default pipeline failed: {result:?}");

    let files: Vec<String> = snapshot(&output).into_iter().map(|(p, _)| p).collect();
    assert_eq!(files, vec!["a/index.html", "b/main.css"]);
    Ok(())
}

#[tokio::test]
async fn building_twice_with_unchanged_inputs_is_byte_identical() -> TestResult {
    let workspace = tempdir()?;
    let src_a = workspace.path().join("src_a");
    let src_b = workspace.path().join("src_b");
    let output = workspace.path().join("dist");

    fs::create_dir_all(&src_a)?;
    fs::create_dir_all(&src_b)?;
    fs::write(src_a.join("page.html"), "<p>hello</p>")?;
    fs::write(src_b.join("app.js"), "console.log(1)")?;

    let cfg = pipeline_config(&src_a, &src_b, &output);
    let orch = Arc::new(Orchestrator::new(cfg, Arc::new(LogNotifier))?);

    let first = runner::run(orch.clone(), Unit::task("build")).await;
    assert!(first.is_success());
    let first_tree = snapshot(&output);

    let second = runner::run(orch, Unit::task("build")).await;
    assert!(second.is_success());
    let second_tree = snapshot(&output);

    assert_eq!(first_tree, second_tree);
    Ok(())
}

#[tokio::test]
async fn scoped_clean_prerequisite_runs_before_the_copy() -> TestResult {
    let workspace = tempdir()?;
    let src = workspace.path().join("assets_src");
    let output = workspace.path().join("dist");

    fs::create_dir_all(&src)?;
    fs::write(src.join("logo.svg"), "svg")?;
    fs::create_dir_all(output.join("assets"))?;
    fs::write(output.join("assets/removed.svg"), "stale")?;

    let mut tasks = BTreeMap::new();
    tasks.insert(
        "clean_assets".to_string(),
        TaskConfig {
            clean: Some("assets".to_string()),
            ..TaskConfig::default()
        },
    );
    let mut assets = copy_task(&src, "assets");
    assets.needs = vec!["clean_assets".to_string()];
    tasks.insert("assets".to_string(), assets);

    let mut cfg = ConfigFile::default();
    cfg.project.output = output.to_string_lossy().into_owned();
    cfg.task = tasks;

    let orch = Arc::new(Orchestrator::new(cfg, Arc::new(LogNotifier))?);
    let result = runner::run(orch, Unit::task("assets")).await;
    assert!(result.is_success());

    assert!(output.join("assets/logo.svg").exists());
    assert!(!output.join("assets/removed.svg").exists());
    Ok(())
}
