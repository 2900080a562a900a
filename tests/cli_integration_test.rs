use anyhow::Result;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

const CONFIG: &str = r#"
[plan]
name = "intgtestBkPlan"
start_hour = 3
start_minute = 0

[[plan.resources]]
type = "tag"
key = "solution"
value = "awsbackuparch"

[stack]
name = "IntegratedBackupTestStack"
tags = { solution = "backupByTag", environment = "dev", costcenter = "cdkappdev" }
"#;

fn backup_plan(dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_backup-plan"));
    cmd.current_dir(dir).env("RUST_LOG", "error");
    cmd
}

fn write_config(dir: &Path) -> PathBuf {
    let path = dir.join("backup-plan.toml");
    fs::write(&path, CONFIG).expect("Failed to write config");
    path
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

#[test]
fn test_cli_help() {
    let temp_dir = TempDir::new().unwrap();
    let output = backup_plan(temp_dir.path())
        .arg("--help")
        .output()
        .expect("Failed to run binary");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("CloudFormation"));
    assert!(stdout.contains("synth"));
    assert!(stdout.contains("validate"));
    assert!(stdout.contains("--config"));
    assert!(stdout.contains("--start-hour"));
}

#[test]
fn test_synth_writes_template() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let config = write_config(temp_dir.path());
    let template_path = temp_dir.path().join("out").join("template.json");

    let output = backup_plan(temp_dir.path())
        .arg("synth")
        .arg("--config")
        .arg(&config)
        .arg("--output")
        .arg(&template_path)
        .output()?;
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--stack-name IntegratedBackupTestStack"));

    let template: Value = serde_json::from_str(&fs::read_to_string(&template_path)?)?;
    let rule = &template["Resources"]["BackupPlan"]["Properties"]["BackupPlan"]["BackupPlanRule"][0];
    assert_eq!(rule["ScheduleExpression"], "cron(0 3 * * ? *)");
    assert_eq!(rule["StartWindowMinutes"], 120);
    assert_eq!(rule["CompletionWindowMinutes"], 180);
    assert_eq!(rule["Lifecycle"]["DeleteAfterDays"], 90);
    assert!(rule["Lifecycle"].get("MoveToColdStorageAfterDays").is_none());
    assert_eq!(
        template["Resources"]["BackupPlan"]["Properties"]["BackupPlanTags"]["costcenter"],
        "cdkappdev"
    );

    let outputs = template["Outputs"].as_object().unwrap();
    assert!(outputs.contains_key("BackupPlanId"));
    assert!(outputs.contains_key("BackupPlanArn"));

    Ok(())
}

#[test]
fn test_synth_refuses_to_overwrite_without_force() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let config = write_config(temp_dir.path());
    let template_path = temp_dir.path().join("template.json");
    fs::write(&template_path, "keep me")?;

    let output = backup_plan(temp_dir.path())
        .args(["synth", "--config"])
        .arg(&config)
        .output()?;
    assert!(!output.status.success());
    assert!(stderr(&output).contains("--force"));
    assert_eq!(fs::read_to_string(&template_path)?, "keep me");

    let output = backup_plan(temp_dir.path())
        .args(["synth", "--force", "--config"])
        .arg(&config)
        .output()?;
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_ne!(fs::read_to_string(&template_path)?, "keep me");

    Ok(())
}

#[test]
fn test_validate_prints_policy() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let config = write_config(temp_dir.path());

    let output = backup_plan(temp_dir.path())
        .args(["validate", "--start-minute", "45", "--config"])
        .arg(&config)
        .output()?;
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let policy: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(policy["plan_name"], "intgtestBkPlan");
    assert_eq!(policy["rules"].as_array().unwrap().len(), 1);
    assert_eq!(policy["rules"][0]["schedule"]["hour"], 3);
    assert_eq!(policy["rules"][0]["schedule"]["minute"], 45);
    assert_eq!(policy["rules"][0]["completion_window"], "3h");
    assert_eq!(policy["rules"][0]["start_window"], "2h");
    assert_eq!(policy["rules"][0]["retention"], "90d");
    assert_eq!(policy["selection"]["name"], "BackupSelection");

    Ok(())
}

#[test]
fn test_invalid_start_hour_fails() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let config = write_config(temp_dir.path());

    for hour in ["24", "-1"] {
        let output = backup_plan(temp_dir.path())
            .args(["validate", "--start-hour", hour, "--config"])
            .arg(&config)
            .output()?;
        assert!(!output.status.success());
        assert!(
            stderr(&output).contains("start hour out of range"),
            "stderr: {}",
            stderr(&output)
        );
    }

    Ok(())
}

#[test]
fn test_inconsistent_windows_fail_synth() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let config = write_config(temp_dir.path());

    let output = backup_plan(temp_dir.path())
        .args(["synth", "--force", "--config"])
        .arg(&config)
        .env("BACKUP_PLAN_COMPLETION_WINDOW", "2h")
        .env("BACKUP_PLAN_START_WINDOW", "2h")
        .output()?;
    assert!(!output.status.success());
    assert!(stderr(&output).contains("at least 60 minutes"));
    assert!(!temp_dir.path().join("template.json").exists());

    Ok(())
}

#[test]
fn test_missing_config_file_fails() {
    let temp_dir = TempDir::new().unwrap();
    let output = backup_plan(temp_dir.path())
        .args(["validate", "--config", "does-not-exist.toml"])
        .output()
        .expect("Failed to run binary");
    assert!(!output.status.success());
    assert!(stderr(&output).contains("does-not-exist.toml"));
}
