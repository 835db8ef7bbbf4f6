use anyhow::Result;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;
use walkdir::WalkDir;

const SOURCE_URN: &str = "urn:li:dataset:(urn:li:dataPlatform:mysql,abc.sales.orders,PROD)";

const PROJECT_CONFIG: &str = r#"
name: "cli-test"
output-path: "mcp_output"
environments:
  staging:
    snapshot: "staging_snapshot.json"
    mutations:
      platform_instances:
        abc: xyz
"#;

/// Throwaway project directory: config, target snapshot and export files.
struct MetabridgeTestEnv {
    _tmp: TempDir,
    root: PathBuf,
}

impl MetabridgeTestEnv {
    fn new() -> Result<Self> {
        let tmp = tempfile::tempdir()?;
        let root = tmp.path().to_path_buf();

        fs::write(root.join("metabridge.yaml"), PROJECT_CONFIG)?;
        let snapshot = json!([
            {
                "urn": "urn:li:dataset:(urn:li:dataPlatform:mysql,xyz.sales.orders,PROD)",
                "type": "dataset",
                "platform": "urn:li:dataPlatform:mysql",
                "name": "xyz.sales.orders"
            },
            {
                "urn": "urn:li:dataset:(urn:li:dataPlatform:mysql,other.table,PROD)",
                "type": "dataset",
                "platform": "urn:li:dataPlatform:mysql",
                "name": "other.table"
            }
        ]);
        fs::write(
            root.join("staging_snapshot.json"),
            serde_json::to_string_pretty(&snapshot)?,
        )?;

        Ok(Self { _tmp: tmp, root })
    }

    fn write_export(&self, export: &Value) -> Result<PathBuf> {
        let path = self.root.join("export.json");
        fs::write(&path, serde_json::to_string(export)?)?;
        Ok(path)
    }

    fn output_dir(&self) -> PathBuf {
        self.root.join("mcp_output")
    }

    fn metabridge(&self) -> Command {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("metabridge"));
        cmd.current_dir(&self.root);
        cmd
    }
}

fn annotated_export() -> Value {
    json!({
        "metadata": {"environment": "dev"},
        "entities": [{
            "urn": SOURCE_URN,
            "type": "DATASET",
            "name": "orders",
            "platformInstance": "abc",
            "browsePaths": ["/sales"],
            "globalTags": {"tags": [{"tag": {"urn": "urn:li:tag:abc"}}]},
            "domain": {"domain": {"urn": "urn:li:domain:sales"}}
        }]
    })
}

fn task_files(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .filter(|p| {
            p.file_name()
                .is_some_and(|n| n != "summary.json" && n != "matches.json")
        })
        .collect()
}

#[test]
fn test_empty_export_dry_run_writes_summary() -> Result<()> {
    let env = MetabridgeTestEnv::new()?;
    env.write_export(&json!([]))?;

    env.metabridge()
        .args(["migrate", "--input", "export.json", "--target-env", "staging", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("SUCCESS"));

    let summary: Value =
        serde_json::from_str(&fs::read_to_string(env.output_dir().join("summary.json"))?)?;
    assert_eq!(summary["source_count"], 0);
    assert_eq!(summary["match_count"], 0);
    assert_eq!(summary["task_count"], 0);
    assert!(task_files(&env.output_dir()).is_empty());
    Ok(())
}

#[test]
fn test_dry_run_writes_change_proposals() -> Result<()> {
    let env = MetabridgeTestEnv::new()?;
    env.write_export(&annotated_export())?;

    env.metabridge()
        .args(["migrate", "--input", "export.json", "--target-env", "staging", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 exact"));

    let files = task_files(&env.output_dir());
    assert_eq!(files.len(), 2);
    for file in &files {
        let task: Value = serde_json::from_str(&fs::read_to_string(file)?)?;
        assert_eq!(
            task["entityUrn"],
            "urn:li:dataset:(urn:li:dataPlatform:mysql,xyz.sales.orders,PROD)"
        );
    }

    let matches: Value =
        serde_json::from_str(&fs::read_to_string(env.output_dir().join("matches.json"))?)?;
    assert_eq!(matches[0]["confidence"], 1.0);
    Ok(())
}

#[test]
fn test_apply_replays_dry_run_output() -> Result<()> {
    let env = MetabridgeTestEnv::new()?;
    env.write_export(&annotated_export())?;

    env.metabridge()
        .args(["migrate", "--input", "export.json", "--target-env", "staging", "--dry-run"])
        .assert()
        .success();

    env.metabridge()
        .args(["apply", "--from", "mcp_output", "--target-env", "staging"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 change proposals emitted, 0 failed"));
    Ok(())
}

#[test]
fn test_live_migrate_against_snapshot() -> Result<()> {
    let env = MetabridgeTestEnv::new()?;
    env.write_export(&annotated_export())?;

    env.metabridge()
        .args(["migrate", "--input", "export.json", "--target-env", "staging"])
        .assert()
        .success();

    let summary: Value =
        serde_json::from_str(&fs::read_to_string(env.output_dir().join("summary.json"))?)?;
    assert_eq!(summary["emitted"], 2);
    assert_eq!(summary["dry_run"], false);
    assert!(task_files(&env.output_dir()).is_empty());
    Ok(())
}

#[test]
fn test_inspect_reports_platforms() -> Result<()> {
    let env = MetabridgeTestEnv::new()?;
    env.write_export(&annotated_export())?;

    env.metabridge()
        .args(["inspect", "--input", "export.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("mysql"))
        .stdout(predicate::str::contains("Environment:       dev"));
    Ok(())
}

#[test]
fn test_missing_export_fails() -> Result<()> {
    let env = MetabridgeTestEnv::new()?;

    env.metabridge()
        .args(["migrate", "--input", "nope.json", "--target-env", "staging", "--dry-run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nope.json"));
    Ok(())
}

#[test]
fn test_unknown_environment_fails() -> Result<()> {
    let env = MetabridgeTestEnv::new()?;
    env.write_export(&json!([]))?;

    env.metabridge()
        .args(["migrate", "--input", "export.json", "--target-env", "prod", "--dry-run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown target environment 'prod'"));
    Ok(())
}

#[test]
fn test_missing_config_fails() -> Result<()> {
    let env = MetabridgeTestEnv::new()?;
    fs::remove_file(env.root.join("metabridge.yaml"))?;
    env.write_export(&json!([]))?;

    env.metabridge()
        .args(["migrate", "--input", "export.json", "--target-env", "staging", "--dry-run"])
        .assert()
        .failure();
    Ok(())
}
