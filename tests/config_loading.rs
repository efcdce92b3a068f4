use std::error::Error;
use std::fs;

use buildwatch::config::load_and_validate;
use tempfile::tempdir;

type TestResult = Result<(), Box<dyn Error>>;

const PIPELINE_TOML: &str = r#"
[project]
source = "project"
output = "dist"

[server]
port = 9090

[task.clean]
clean = "."

[task.templates]
cmd = "render-templates project dist"
watch = { roots = ["project"], globs = ["**/*.html", "common/*.tmpl"] }

[task.assets]
copy = { from = "project/assets", into = "assets", flatten = true }
needs = ["clean_assets"]

[task.clean_assets]
clean = "assets"

[task.build]
parallel = ["templates", "assets"]

[task.default]
series = ["clean", "build"]
"#;

#[test]
fn full_pipeline_config_loads_with_defaults_applied() -> TestResult {
    let dir = tempdir()?;
    let path = dir.path().join("Buildwatch.toml");
    fs::write(&path, PIPELINE_TOML)?;

    let cfg = load_and_validate(&path)?;

    assert_eq!(cfg.project.source, "project");
    assert_eq!(cfg.project.output, "dist");
    assert_eq!(cfg.server.port, 9090);
    assert_eq!(cfg.task.len(), 6);

    let assets = cfg.task.get("assets").unwrap();
    let copy = assets.copy.as_ref().unwrap();
    assert!(copy.flatten);
    assert!(copy.only_changed, "only_changed should default to true");
    assert_eq!(copy.globs, vec!["**/*".to_string()]);
    assert_eq!(assets.needs, vec!["clean_assets".to_string()]);

    let templates = cfg.task.get("templates").unwrap();
    let watch = templates.watch.as_ref().unwrap();
    assert_eq!(watch.roots, vec!["project".to_string()]);
    assert_eq!(watch.globs.len(), 2);
    Ok(())
}

#[test]
fn unknown_composite_member_is_rejected_at_load_time() -> TestResult {
    let dir = tempdir()?;
    let path = dir.path().join("Buildwatch.toml");
    fs::write(
        &path,
        r#"
[task.build]
parallel = ["styles"]
"#,
    )?;

    let err = load_and_validate(&path).unwrap_err();
    assert!(err.to_string().contains("unknown task 'styles'"));
    Ok(())
}

#[test]
fn missing_config_file_is_an_error() {
    assert!(load_and_validate("/definitely/not/Buildwatch.toml").is_err());
}
