//! CLI integration tests
use std::fs;
use std::path::PathBuf;

use predicates::prelude::*;
use tempfile::TempDir;

fn cmd() -> assert_cmd::Command {
    assert_cmd::cargo::cargo_bin_cmd!("declutter")
}

fn get_fixture_path(name: &str) -> String {
    format!("../../tests/fixtures/{}", name)
}

/// Copies a fixture into a scratch directory so outputs land there.
fn scratch_fixture(name: &str) -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join(name);
    fs::copy(get_fixture_path(name), &path).unwrap();
    (tmp, path)
}

#[test]
fn test_cli_clean() {
    let (tmp, input) = scratch_fixture("article.html");

    cmd()
        .args(["-s", "0"])
        .arg(&input)
        .assert()
        .success()
        .stderr(predicate::str::contains("File saved as"));

    let cleaned = fs::read_to_string(tmp.path().join("article_cleaned.html")).unwrap();
    assert!(cleaned.contains(r#"<div class="exercise">"#));
    assert!(!cleaned.contains("<script"));
}

#[test]
fn test_cli_remove_and_separate_tables() {
    let (tmp, input) = scratch_fixture("article.html");

    cmd().args(["-s", "1", "-s", "2"]).arg(&input).assert().success();

    let page = fs::read_to_string(tmp.path().join("article_no_tables.html")).unwrap();
    let tables = fs::read_to_string(tmp.path().join("article_tables_only.html")).unwrap();
    assert!(!page.contains("<table"));
    assert!(tables.starts_with(r#"<table id="counts""#));
    assert!(tables.contains(r#"id="breakdown""#));
}

#[test]
fn test_cli_operation_names() {
    let (tmp, input) = scratch_fixture("nested_tables.html");

    cmd().args(["--select", "separate_tables"]).arg(&input).assert().success();

    assert!(tmp.path().join("nested_tables_tables_only.html").exists());
}

#[test]
fn test_cli_save_content() {
    let (tmp, input) = scratch_fixture("article.html");

    cmd().args(["-s", "3"]).arg(&input).assert().success();

    assert!(tmp.path().join("article_content.txt").exists());
}

#[test]
fn test_cli_no_tables_warning() {
    let (tmp, input) = scratch_fixture("no_tables.html");

    cmd()
        .args(["-s", "2"])
        .arg(&input)
        .assert()
        .success()
        .stderr(predicate::str::contains("No tables found to separate."));

    assert_eq!(fs::read_to_string(tmp.path().join("no_tables_tables_only.html")).unwrap(), "");
}

#[test]
fn test_cli_strict_fails_on_empty_result() {
    let (_tmp, input) = scratch_fixture("no_tables.html");

    cmd()
        .args(["--strict", "-s", "2"])
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("No tables found in the document"));
}

#[test]
fn test_cli_invalid_file() {
    cmd()
        .args(["-s", "0", "nonexistent.html"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to open nonexistent.html"));
}

#[test]
fn test_cli_invalid_selection() {
    let (_tmp, input) = scratch_fixture("article.html");
    cmd().args(["-s", "7"]).arg(&input).assert().failure();
}

#[test]
fn test_cli_out_dir() {
    let (tmp, input) = scratch_fixture("article.html");
    let out_dir = tmp.path().join("out");

    cmd()
        .args(["-s", "0", "--out-dir", out_dir.to_str().unwrap()])
        .arg(&input)
        .assert()
        .success();

    assert!(out_dir.join("article_cleaned.html").exists());
    assert!(!tmp.path().join("article_cleaned.html").exists());
}

#[test]
fn test_cli_keep_flags() {
    let (tmp, input) = scratch_fixture("article.html");

    cmd()
        .args(["-s", "0", "--keep-images", "--keep-spans", "--keep-lang", "--no-wrap-images"])
        .arg(&input)
        .assert()
        .success();

    let cleaned = fs::read_to_string(tmp.path().join("article_cleaned.html")).unwrap();
    assert!(cleaned.contains(r#"<img src="east-bank.jpg""#));
    assert!(cleaned.contains(r#"<span class="place">"#));
    assert!(cleaned.contains(r#"lang="en""#));
    assert!(!cleaned.contains("exercise"));
}

#[test]
fn test_cli_json_report() {
    let (tmp, input) = scratch_fixture("article.html");

    let output = cmd().args(["--json", "-s", "0"]).arg(&input).output().unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["operation"], "clean");
    assert_eq!(report["notice"], serde_json::Value::Null);
    assert_eq!(
        report["outputs"][0].as_str().unwrap(),
        tmp.path().join("article_cleaned.html").to_str().unwrap()
    );
}

#[test]
fn test_cli_interactive_menu() {
    let (tmp, input) = scratch_fixture("article.html");

    cmd()
        .arg(&input)
        .write_stdin("0 2\n4\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Available options:"))
        .stdout(predicate::str::contains("Process completed."))
        .stdout(predicate::str::ends_with("Exiting...\n"));

    assert!(tmp.path().join("article_cleaned.html").exists());
    assert!(tmp.path().join("article_tables_only.html").exists());
}

#[test]
fn test_cli_interactive_prompts_for_path() {
    let (tmp, input) = scratch_fixture("article.html");

    cmd()
        .write_stdin(format!("{}\n1\n", input.display()))
        .assert()
        .success()
        .stdout(predicate::str::contains("Enter the path to the HTML file:"));

    assert!(tmp.path().join("article_no_tables.html").exists());
}

#[test]
fn test_cli_interactive_retries_missing_path() {
    let (tmp, input) = scratch_fixture("article.html");

    cmd()
        .write_stdin(format!("missing.html\n{}\n0\n4\n", input.display()))
        .assert()
        .success()
        .stderr(predicate::str::contains("Failed to open missing.html"))
        .stdout(predicate::str::contains("Available options:"))
        .stdout(predicate::str::ends_with("Exiting...\n"));

    assert!(tmp.path().join("article_cleaned.html").exists());
}

#[test]
fn test_cli_interactive_gives_up_at_end_of_input() {
    cmd()
        .write_stdin("missing.html\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("No file selected."));
}

#[test]
fn test_cli_interactive_empty_path() {
    cmd()
        .write_stdin("\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("No file selected."));
}

#[test]
fn test_cli_interactive_invalid_option() {
    let (_tmp, input) = scratch_fixture("article.html");

    cmd()
        .arg(&input)
        .write_stdin("9\n4\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Invalid option: 9"));
}

#[test]
fn test_cli_verbose() {
    let (_tmp, input) = scratch_fixture("article.html");

    cmd()
        .args(["-v", "-s", "0"])
        .arg(&input)
        .assert()
        .success()
        .stderr(predicate::str::contains("Declutter"))
        .stderr(predicate::str::contains("Timing Summary"));
}

#[test]
fn test_cli_completions() {
    cmd()
        .args(["--completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("declutter"));
}
