use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::error::Error;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::tempdir;

fn write_estimate(root: &Path, group: &str, param: &str, mean: f64) -> Result<(), Box<dyn Error>> {
    let dir = root.join(group).join(param).join("new");
    fs::create_dir_all(&dir)?;
    fs::write(
        dir.join("estimates.json"),
        format!(
            r#"{{"mean":{{"confidence_interval":{{"confidence_level":0.95,"lower_bound":{},"upper_bound":{}}},"point_estimate":{},"standard_error":1.0}}}}"#,
            mean * 0.98,
            mean * 1.02,
            mean
        ),
    )?;
    Ok(())
}

fn criterion_fixture(root: &Path) -> Result<(), Box<dyn Error>> {
    write_estimate(root, "jmt_insert", "10", 17_900.0)?;
    write_estimate(root, "jmt_insert", "100", 182_700.0)?;
    write_estimate(root, "jmt_insert", "1000", 1_798_300.0)?;
    write_estimate(root, "jmt_get", "10", 17_885.0)?;
    fs::create_dir_all(root.join("report"))?;
    fs::write(root.join("report").join("index.html"), "<html></html>")?;
    Ok(())
}

fn benchviz() -> Result<Command, Box<dyn Error>> {
    let mut cmd = Command::cargo_bin("benchviz")?;
    cmd.env_remove("BENCHVIZ_LOG").env_remove("RUST_LOG");
    Ok(cmd)
}

#[test]
fn writes_charts_and_summaries() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let root = dir.path().join("criterion");
    let out = dir.path().join("out");
    criterion_fixture(&root)?;

    benchviz()?
        .arg("--root")
        .arg(&root)
        .arg("--output")
        .arg(&out)
        .args(["--timestamp", "2024-05-01T12:00:00Z"])
        .assert()
        .success()
        .stdout(predicate::str::contains("jmt_insert_visualization.svg"))
        .stdout(predicate::str::contains("summary.md"));

    let svg = fs::read_to_string(out.join("jmt_get_visualization.svg"))?;
    assert!(svg.contains("17.89µs"));
    assert!(out.join("jmt_insert_visualization.svg").is_file());

    let summary = fs::read_to_string(out.join("summary.md"))?;
    assert!(summary.contains("Per-entry cost trend: stable"));

    let json = fs::read_to_string(out.join("summary.json"))?;
    assert!(json.contains("\"generated_at\": \"2024-05-01T12:00:00Z\""));
    assert!(out.join("summary.csv").is_file());
    assert!(!root.join("jmt_get_visualization.svg").exists());
    Ok(())
}

#[test]
fn report_subcommand_honours_table_flags() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let root = dir.path().join("criterion");
    let out = dir.path().join("out");
    criterion_fixture(&root)?;

    benchviz()?
        .arg("report")
        .arg("--root")
        .arg(&root)
        .arg("--output")
        .arg(&out)
        .args(["--no-json", "--no-csv", "--parallel"])
        .assert()
        .success();

    assert!(out.join("summary.md").is_file());
    assert!(!out.join("summary.json").exists());
    assert!(!out.join("summary.csv").exists());
    Ok(())
}

#[test]
fn empty_root_reports_no_data() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let root = dir.path().join("criterion");
    let out = dir.path().join("out");
    fs::create_dir_all(&root)?;

    benchviz()?
        .arg("--root")
        .arg(&root)
        .arg("--output")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("no data to visualize"));

    let entries: Vec<_> = fs::read_dir(&out)?.collect::<Result<_, _>>()?;
    assert_eq!(entries.len(), 1);
    assert!(fs::read_to_string(out.join("summary.md"))?.contains("no data to visualize"));
    Ok(())
}

#[test]
fn missing_root_is_not_an_error() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let out = dir.path().join("out");

    benchviz()?
        .arg("--root")
        .arg(dir.path().join("never-ran"))
        .arg("--output")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("no data to visualize"))
        .stderr(predicate::str::contains("run benchmarks first"));

    assert!(fs::read_to_string(out.join("summary.md"))?.contains("run benchmarks first"));
    Ok(())
}

#[test]
fn failed_artifact_exits_with_partial_code() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let root = dir.path().join("criterion");
    let out = dir.path().join("out");
    criterion_fixture(&root)?;
    fs::create_dir_all(out.join("jmt_get_visualization.svg"))?;

    benchviz()?
        .arg("--root")
        .arg(&root)
        .arg("--output")
        .arg(&out)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("failed to write"));

    assert!(out.join("jmt_insert_visualization.svg").is_file());
    assert!(out.join("summary.md").is_file());
    Ok(())
}

#[test]
fn root_that_is_a_file_fails() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let root = dir.path().join("criterion");
    fs::write(&root, "not a directory")?;

    benchviz()?
        .arg("--root")
        .arg(&root)
        .arg("--output")
        .arg(dir.path().join("out"))
        .assert()
        .code(1)
        .stdout(predicate::str::contains("no data to visualize").not())
        .stderr(predicate::str::contains("is not a directory"));
    Ok(())
}

#[test]
fn unusable_output_directory_fails() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let root = dir.path().join("criterion");
    criterion_fixture(&root)?;
    let blocker = dir.path().join("occupied");
    fs::write(&blocker, "not a directory")?;

    benchviz()?
        .arg("--root")
        .arg(&root)
        .arg("--output")
        .arg(blocker.join("out"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to prepare output directory"));
    Ok(())
}

#[test]
fn invalid_config_fails() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let config = dir.path().join("benchviz.toml");
    fs::write(&config, "[analysis]\nunknown_knob = 1\n")?;

    benchviz()?
        .arg("--root")
        .arg(dir.path())
        .arg("--output")
        .arg(dir.path().join("out"))
        .arg("--config")
        .arg(&config)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid configuration"));
    Ok(())
}

#[test]
fn list_prints_records_without_writing() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let root = dir.path().join("criterion");
    criterion_fixture(&root)?;

    benchviz()?
        .arg("list")
        .arg("--root")
        .arg(&root)
        .current_dir(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("jmt_insert"))
        .stdout(predicate::str::contains("1.80ms"))
        .stdout(predicate::str::contains("17.89µs"));

    assert!(!dir.path().join("target").exists());
    Ok(())
}
