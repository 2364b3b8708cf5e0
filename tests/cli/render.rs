//! Render subcommand tests

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

#[test]
fn test_render_mount_points() {
    cargo_bin_cmd!("mapfence")
        .arg("render")
        .write_stdin("Map:\n\n```map\nbasemap: gray\nheight: 300\n```\n\nDone.\n")
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "Map:\n\n<div class=\"mapfence-map\" style=\"height: 300px; width: 100%;\"",
        ))
        .stdout(predicate::str::contains("&quot;basemap&quot;:&quot;gray&quot;"))
        .stdout(predicate::str::ends_with("></div>\n\nDone.\n"));
}

#[test]
fn test_render_out_of_range_center_is_inline_error() {
    cargo_bin_cmd!("mapfence")
        .arg("render")
        .write_stdin("a <arcgis-map lat=\"120\" lng=\"0\" /> b\n")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "a <div class=\"mapfence-error\" role=\"alert\">Map failed to load:",
        ))
        .stdout(predicate::str::ends_with("</div> b\n"));
}

#[test]
fn test_render_strip_token() {
    let input = "<arcgis-map token=\"secret-123\" />\n";

    cargo_bin_cmd!("mapfence")
        .arg("render")
        .write_stdin(input)
        .assert()
        .success()
        .stdout(predicate::str::contains("secret-123"));

    cargo_bin_cmd!("mapfence")
        .args(["render", "--strip-token"])
        .write_stdin(input)
        .assert()
        .success()
        .stdout(predicate::str::contains("secret-123").not());
}
