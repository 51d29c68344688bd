//! CLI integration tests
//!
//! These tests run the jarlens binary against archives written to a
//! temporary directory.

use assert_cmd::Command;
use jarlens::test_utils::{ClassFileBuilder, JarBuilder};
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

fn jarlens() -> Command {
    let mut cmd = Command::cargo_bin("jarlens").unwrap();
    cmd.env("NO_COLOR", "1").env_remove("JAVA_HOME");
    cmd
}

fn write_jar(dir: &Path, name: &str, classes: Vec<ClassFileBuilder>) {
    classes
        .into_iter()
        .fold(JarBuilder::new(), |jar, class| jar.class(class.build()))
        .write_to(&dir.join(name));
}

/// a.jar {a.A, a.B} and b.jar {a.B, b.C}; a.A uses b.C and the missing c.C
fn overlapping_jars() -> TempDir {
    let dir = TempDir::new().unwrap();
    write_jar(
        dir.path(),
        "a.jar",
        vec![
            ClassFileBuilder::new("a/A").class_ref("b/C").class_ref("c/C"),
            ClassFileBuilder::new("a/B"),
        ],
    );
    write_jar(
        dir.path(),
        "b.jar",
        vec![ClassFileBuilder::new("a/B"), ClassFileBuilder::new("b/C")],
    );
    dir
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_help() {
    jarlens()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--max-release"))
        .stdout(predicate::str::contains("--strategy"));
}

#[test]
fn test_version() {
    jarlens()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_empty_directory() {
    let dir = TempDir::new().unwrap();
    jarlens()
        .arg(dir.path())
        .arg("--quiet")
        .assert()
        .success()
        .stdout(predicate::str::contains("No JAR, WAR or JMOD files found"));
}

#[test]
fn test_invalid_strategy_is_rejected() {
    let dir = overlapping_jars();
    jarlens()
        .arg(dir.path())
        .args(["--strategy", "sideways"])
        .assert()
        .failure();
}

// ============================================================================
// Report Output
// ============================================================================

#[test]
fn test_terminal_report() {
    let dir = overlapping_jars();
    jarlens()
        .arg(dir.path())
        .arg("--quiet")
        .assert()
        .success()
        .stdout(predicate::str::contains("Duplicate Classes"))
        .stdout(predicate::str::contains("a.B"))
        .stdout(predicate::str::contains("c.C"))
        .stdout(predicate::str::contains("Found 3 classpath issues"));
}

#[test]
fn test_json_report() {
    let dir = overlapping_jars();
    let output = jarlens()
        .arg(dir.path())
        .args(["--format", "json", "--quiet"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["total_issues"], 3);
    assert_eq!(json["duplicate_classes"][0]["class_name"], "a.B");
    assert_eq!(json["duplicate_classes"][0]["artifacts"][0], "a.jar");
    assert_eq!(json["duplicate_classes"][0]["artifacts"][1], "b.jar");
    assert_eq!(json["split_packages"][0]["package"], "a");
    assert_eq!(json["unresolved_classes"][0]["artifact"], "a.jar");
    assert_eq!(json["artifacts"].as_array().map(Vec::len), Some(2));
}

#[test]
fn test_report_written_to_file() {
    let dir = overlapping_jars();
    let out = TempDir::new().unwrap();
    let report = out.path().join("report.json");

    jarlens()
        .arg(dir.path())
        .args(["--format", "json", "--quiet", "--output"])
        .arg(&report)
        .assert()
        .success()
        .stdout(predicate::str::contains("Report written to"));

    let json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(json["total_issues"], 3);
}

#[test]
fn test_no_references_disables_dependency_sections() {
    let dir = overlapping_jars();
    let output = jarlens()
        .arg(dir.path())
        .args(["--format", "json", "--quiet", "--no-references"])
        .output()
        .unwrap();

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(json.get("jar_dependencies").is_none());
    assert!(json.get("unresolved_classes").is_none());
    assert_eq!(json["total_issues"], 2);
}

// ============================================================================
// Exit Codes and Configuration
// ============================================================================

#[test]
fn test_fail_on_issues() {
    let dir = overlapping_jars();
    jarlens()
        .arg(dir.path())
        .args(["--quiet", "--fail-on-issues"])
        .assert()
        .code(1);
}

#[test]
fn test_clean_classpath_passes_fail_on_issues() {
    let dir = TempDir::new().unwrap();
    write_jar(dir.path(), "clean.jar", vec![ClassFileBuilder::new("c/Clean")]);

    jarlens()
        .arg(dir.path())
        .args(["--quiet", "--fail-on-issues"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No classpath issues found"));
}

#[test]
fn test_exclude_pattern() {
    let dir = overlapping_jars();
    let output = jarlens()
        .arg(dir.path())
        .args(["--format", "json", "--quiet", "--exclude", "*b.jar"])
        .output()
        .unwrap();

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["artifacts"].as_array().map(Vec::len), Some(1));
    assert!(json["duplicate_classes"].as_array().map_or(true, Vec::is_empty));
}

#[test]
fn test_config_file_disables_analyzers() {
    let dir = overlapping_jars();
    let config = dir.path().join("jarlens.yml");
    std::fs::write(&config, "analysis:\n  duplicate_classes: false\n  split_packages: false\n").unwrap();

    let output = jarlens()
        .arg(dir.path())
        .args(["--format", "json", "--quiet", "--config"])
        .arg(&config)
        .output()
        .unwrap();

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(json.get("duplicate_classes").is_none());
    assert!(json.get("split_packages").is_none());
    assert_eq!(json["total_issues"], 1);
}
