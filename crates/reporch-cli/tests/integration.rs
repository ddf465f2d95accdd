#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn reporch(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("reporch").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("REPORCH_REPO_DIR")
        .env_remove("RUST_LOG");
    cmd
}

fn git_available() -> bool {
    which::which("git").is_ok()
}

const PAIR: &str = r#"{
    "developer_strategy": "round-robin",
    "developer_data": [["Alice", "alice@example.com"], ["Bob", "bob@example.com"]],
    "repo_age_in_days": 1,
    "max_commits_per_branch": 1
}"#;

// ---------------------------------------------------------------------------
// reporch config
// ---------------------------------------------------------------------------

#[test]
fn config_show_defaults() {
    let dir = TempDir::new().unwrap();
    reporch(&dir)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("random_seed: 42"))
        .stdout(predicate::str::contains("developer_strategy: random-uniform"))
        .stdout(predicate::str::contains("repo_dir: repository"));
}

#[test]
fn config_show_reads_default_file() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("reporch.json"), r#"{"repo_age_in_days": 2}"#).unwrap();
    reporch(&dir)
        .args(["--json", "config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("reporch.json"))
        .stdout(predicate::str::contains(r#""repo_age_in_days": 2"#));
}

#[test]
fn config_show_inline_json() {
    let dir = TempDir::new().unwrap();
    let out = reporch(&dir)
        .args(["--json", "config", "show", r#"{"random_seed": 7}"#])
        .output()
        .unwrap();
    assert!(out.status.success());
    let value: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(value["source"]["kind"], "inline");
    assert_eq!(value["config"]["random_seed"], 7);
}

#[test]
fn config_validate_yaml_file() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("team.yaml"),
        "developer_strategy: round-robin\nrepo_age_in_days: 3\n",
    )
    .unwrap();
    reporch(&dir)
        .args(["config", "validate", "team.yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Config is valid"));
}

#[test]
fn config_validate_rejects_unknown_strategy() {
    let dir = TempDir::new().unwrap();
    reporch(&dir)
        .args([
            "config",
            "validate",
            r#"{"developer_strategy": "unknown-strategy"}"#,
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"))
        .stderr(predicate::str::contains("unknown-strategy"));
}

#[test]
fn config_validate_rejects_trunk_matching_a_ticket() {
    let dir = TempDir::new().unwrap();
    reporch(&dir)
        .args([
            "config",
            "validate",
            r#"{"trunk_branch": "ACME-3", "repo_age_in_days": 10}"#,
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("collide with trunk branch 'ACME-3'"));
}

#[test]
fn config_validate_rejects_malformed_json() {
    let dir = TempDir::new().unwrap();
    reporch(&dir)
        .args(["config", "validate", "{not json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load config"));
}

#[test]
fn config_validate_reports_warnings() {
    let dir = TempDir::new().unwrap();
    reporch(&dir)
        .args([
            "config",
            "validate",
            r#"{"developer_data": [["a", "a@x.io"], ["a", "a@x.io"]]}"#,
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("[warning]"));
}

// ---------------------------------------------------------------------------
// reporch run
// ---------------------------------------------------------------------------

#[test]
fn dry_run_writes_snapshot_only() {
    let dir = TempDir::new().unwrap();
    reporch(&dir)
        .args(["run", PAIR, "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("merges"))
        .stdout(predicate::str::contains("dry run"));

    assert!(!dir.path().join("repository").exists());
    let text = std::fs::read_to_string(dir.path().join("model.yaml")).unwrap();
    let snapshot: serde_yaml::Value = serde_yaml::from_str(&text).unwrap();
    assert_eq!(snapshot["content_generator"].as_str(), Some("LoremText"));
    assert_eq!(snapshot["random_state"].as_str(), Some("chacha8:42"));
    assert!(snapshot["config"].get("developer_data").is_some());
    assert!(snapshot["model"]
        .as_str()
        .unwrap()
        .starts_with("Model<developer="));
}

#[test]
fn dry_run_json_report() {
    let dir = TempDir::new().unwrap();
    let out = reporch(&dir)
        .args(["--json", "run", PAIR, "--dry-run", "--snapshot", "out/snap.yaml"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let value: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(value["report"]["ticks"], 24);
    assert_eq!(value["report"]["merges"], 23);
    assert_eq!(value["report"]["features_opened"], 24);
    assert!(dir.path().join("out/snap.yaml").is_file());
}

#[test]
fn zero_age_run_still_finalizes() {
    let dir = TempDir::new().unwrap();
    reporch(&dir)
        .args(["run", r#"{"repo_age_in_days": 0}"#, "--dry-run"])
        .assert()
        .success();
    let text = std::fs::read_to_string(dir.path().join("model.yaml")).unwrap();
    assert!(text.contains("Model<developer=None, ticket=None, commits=0, planned=0>"));
}

#[test]
fn run_rejects_root_repo_dir() {
    let dir = TempDir::new().unwrap();
    reporch(&dir)
        .args(["run", "--repo-dir", "/", "--dry-run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid configuration"));
    assert!(!dir.path().join("model.yaml").exists());
}

#[test]
fn run_builds_git_repository() {
    if !git_available() {
        return;
    }
    let dir = TempDir::new().unwrap();
    reporch(&dir)
        .args(["run", PAIR, "--repo-dir", "history"])
        .assert()
        .success();

    let repo = dir.path().join("history");
    assert!(repo.join(".git").is_dir());
    let out = std::process::Command::new("git")
        .arg("-C")
        .arg(&repo)
        .args(["rev-list", "--merges", "--count", "master"])
        .output()
        .unwrap();
    assert_eq!(String::from_utf8_lossy(&out.stdout).trim(), "23");
}

#[test]
fn run_twice_replaces_repository() {
    if !git_available() {
        return;
    }
    let dir = TempDir::new().unwrap();
    for _ in 0..2 {
        reporch(&dir)
            .args(["run", PAIR, "--repo-dir", "history"])
            .assert()
            .success();
    }
    let out = std::process::Command::new("git")
        .arg("-C")
        .arg(dir.path().join("history"))
        .args(["branch", "--list"])
        .output()
        .unwrap();
    let branches = String::from_utf8_lossy(&out.stdout);
    assert_eq!(branches.lines().count(), 2, "{branches}");
}
