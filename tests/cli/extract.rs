//! Extract subcommand tests

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_extract_stdin() {
    cargo_bin_cmd!("mapfence")
        .arg("extract")
        .write_stdin("Office: <arcgis-map lat=\"34\" lng=\"-117\" />\n")
        .assert()
        .success()
        .stdout("Office: __MAP_PLACEHOLDER_0__\n");
}

#[test]
fn test_extract_without_maps_is_identity() {
    let input = "# Heading\n\nParagraph with `code`.\n";
    cargo_bin_cmd!("mapfence")
        .arg("extract")
        .write_stdin(input)
        .assert()
        .success()
        .stdout(input);
}

#[test]
fn test_extract_file() {
    let temp_dir = TempDir::new().unwrap();
    let test_file = temp_dir.path().join("doc.md");
    fs::write(&test_file, "```map\nzoom: 3\n```\n\ntext\n").unwrap();

    cargo_bin_cmd!("mapfence")
        .args(["extract", test_file.to_str().unwrap()])
        .assert()
        .success()
        .stdout("__MAP_PLACEHOLDER_0__\n\ntext\n");
}

#[test]
fn test_extract_json() {
    let output = cargo_bin_cmd!("mapfence")
        .args(["extract", "--json"])
        .write_stdin("```map\ncenter: [1, 2]\nbasemap: gray\n```\n\n```map\nzoom: [\n```\n")
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["maps"][0]["placeholder"], "__MAP_PLACEHOLDER_0__");
    assert_eq!(value["maps"][0]["config"]["basemap"], "gray");
    assert_eq!(value["maps"][0]["config"]["center"]["lat"], 1.0);
    assert_eq!(value["errors"].as_array().map(Vec::len), Some(1));
    assert_eq!(value["errors"][0]["dialect"], "fenced");
    assert!(
        value["content"]
            .as_str()
            .unwrap()
            .contains("```map\nzoom: [\n```")
    );
}

#[test]
fn test_extract_discovers_config() {
    let temp_dir = TempDir::new().unwrap();
    let test_file = temp_dir.path().join("doc.md");
    fs::write(&test_file, "<arcgis-map /> and <geo-map />\n").unwrap();
    fs::write(
        temp_dir.path().join(".mapfence.toml"),
        "[dialects]\ntag_names = [\"geo-map\"]\n",
    )
    .unwrap();

    cargo_bin_cmd!("mapfence")
        .args(["extract", test_file.to_str().unwrap()])
        .assert()
        .success()
        .stdout("<arcgis-map /> and __MAP_PLACEHOLDER_0__\n");
}

#[test]
fn test_extract_explicit_config() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.path().join("custom.toml");
    fs::write(&config_file, "on_invalid = \"drop\"\n").unwrap();

    cargo_bin_cmd!("mapfence")
        .args(["extract", "--config", config_file.to_str().unwrap()])
        .write_stdin("a\n```map\nzoom: [\n```\nb\n")
        .assert()
        .success()
        .stdout(predicate::str::diff("a\n\nb\n"));
}
