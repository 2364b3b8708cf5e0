//! Cross-cutting CLI tests (help, version, error handling)

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

#[test]
fn test_help() {
    cargo_bin_cmd!("mapfence")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Mapfence finds map declarations"));
}

#[test]
fn test_version() {
    cargo_bin_cmd!("mapfence")
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_no_subcommand() {
    cargo_bin_cmd!("mapfence")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage:"));
}

#[test]
fn test_invalid_subcommand() {
    cargo_bin_cmd!("mapfence")
        .arg("invalid")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

#[test]
fn test_extract_help() {
    cargo_bin_cmd!("mapfence")
        .args(["extract", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("__MAP_PLACEHOLDER_<n>__"));
}

#[test]
fn test_missing_file() {
    cargo_bin_cmd!("mapfence")
        .args(["extract", "does-not-exist.md"])
        .assert()
        .failure();
}

#[test]
fn test_man_pages_are_generated() {
    let man_dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("target/man");
    assert!(man_dir.join("mapfence.1").exists());
    for name in ["extract", "check", "render"] {
        let page = std::fs::read_to_string(man_dir.join(format!("mapfence-{name}.1"))).unwrap();
        assert!(page.contains(&format!("mapfence\\-{name}")));
    }
}
