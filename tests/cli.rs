//! Smoke tests for the boardbot binary.
//!
//! These only exercise paths that fail before any network access: CLI
//! surface and configuration loading.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

fn boardbot() -> Command {
    cargo_bin_cmd!("boardbot")
}

#[test]
fn help_describes_the_bot() {
    boardbot()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("mirrors a GitHub project board"));
}

#[test]
fn version_succeeds() {
    boardbot().arg("--version").assert().success();
}

#[test]
fn missing_config_file_fails_with_diagnostic() {
    boardbot()
        .arg("--config")
        .arg("/nonexistent/boardbot.toml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read config"));
}

#[test]
fn invalid_config_fails_validation() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(
        br#"
organization = "acme"
project = "Release board"
developing_column = "Same"
testing_column = "Same"
qa_team = "qa"
dev_team = "developers"
token = "t"
webhook_secret = "s"
"#,
    )
    .unwrap();

    boardbot()
        .arg("--config")
        .arg(file.path())
        .env_remove("BOARDBOT_TOKEN")
        .env_remove("BOARDBOT_WEBHOOK_SECRET")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid configuration"));
}
