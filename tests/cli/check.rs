//! Check subcommand tests

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_check_clean_document() {
    cargo_bin_cmd!("mapfence")
        .arg("check")
        .write_stdin("<arcgis-map lat=\"1\" lng=\"2\" />\n\n```map\nzoom: 3\n```\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("No issues found (2 map(s))"));
}

#[test]
fn test_check_malformed_block_fails() {
    let temp_dir = TempDir::new().unwrap();
    let test_file = temp_dir.path().join("doc.md");
    fs::write(&test_file, "Intro\n\n```map\ncenter: [1, 2\n```\n").unwrap();

    cargo_bin_cmd!("mapfence")
        .args(["check", test_file.to_str().unwrap()])
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("[invalid-map-block]"))
        .stdout(predicate::str::contains("doc.md:3:1"))
        .stdout(predicate::str::contains("Found 1 issue(s)"));
}

#[test]
fn test_check_warnings_do_not_fail() {
    cargo_bin_cmd!("mapfence")
        .arg("check")
        .write_stdin("<arcgis-map lat=\"95\" lng=\"0\" basemap=\"moon\" />\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("[coordinate-out-of-range]"))
        .stdout(predicate::str::contains("[unknown-basemap]"))
        .stdout(predicate::str::contains("<stdin>:1:1"));
}
