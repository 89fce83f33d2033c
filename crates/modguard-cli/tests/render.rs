//! `md`, `annotations` and `explain` subcommands.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

#[allow(deprecated)]
fn modguard_cmd() -> Command {
    Command::cargo_bin("modguard").expect("modguard binary not found - run `cargo build` first")
}

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("tests")
        .join("fixtures")
}

fn write_example_report(dir: &Path) -> PathBuf {
    let report = dir.join("report.json");
    modguard_cmd()
        .current_dir(fixtures_dir())
        .args(["check", "example_mod/ExampleMod.json", "--refs", "refs"])
        .arg("--report-out")
        .arg(&report)
        .assert()
        .code(2);
    report
}

#[test]
fn md_renders_existing_report() {
    let tmp = TempDir::new().expect("temp dir");
    let report = write_example_report(tmp.path());

    modguard_cmd()
        .arg("md")
        .arg("--report")
        .arg(&report)
        .assert()
        .success()
        .stdout(predicate::str::contains("# Modguard report"))
        .stdout(predicate::str::contains("ExampleMod.Spawner::Spawn()"));
}

#[test]
fn annotations_respect_max() {
    let tmp = TempDir::new().expect("temp dir");
    let report = write_example_report(tmp.path());

    let output = modguard_cmd()
        .arg("annotations")
        .arg("--report")
        .arg(&report)
        .args(["--max", "2"])
        .output()
        .expect("run annotations");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines.iter().all(|l| l.starts_with("::error file=")));
}

#[test]
fn md_rejects_foreign_report() {
    let tmp = TempDir::new().expect("temp dir");
    let report = tmp.path().join("other.json");
    std::fs::write(&report, r#"{"schema":"something.else"}"#).expect("write");

    modguard_cmd()
        .arg("md")
        .arg("--report")
        .arg(&report)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown report schema"));
}

#[test]
fn explain_known_check() {
    modguard_cmd()
        .args(["explain", "restriction.member"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Remediation"));
}

#[test]
fn explain_unknown_lists_available_ids() {
    modguard_cmd()
        .args(["explain", "no.such.check"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Available check_ids:"))
        .stderr(predicate::str::contains("restriction.inheritance"));
}
