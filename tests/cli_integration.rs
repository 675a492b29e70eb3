//! CLI integration tests
//!
//! Tests the `sso-session` binary surface and the browser-free fast path.

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

#[test]
fn test_version_flag() {
    let mut cmd = cargo_bin_cmd!("sso-session");
    cmd.arg("--version");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_help_flag() {
    let mut cmd = cargo_bin_cmd!("sso-session");
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("storage-file"))
        .stdout(predicate::str::contains("no-auth-window"))
        .stdout(predicate::str::contains("redirect-timeout-secs"));
}

#[test]
fn test_fast_path_refresh_without_browser() {
    let temp_dir = TempDir::new().unwrap();
    let storage_file = temp_dir.path().join("session.json");
    std::fs::write(
        &storage_file,
        r#"{"lastAuthCookie":"tok-from-store","cookies":[]}"#,
    )
    .unwrap();

    let mut cmd = cargo_bin_cmd!("sso-session");
    cmd.args(["--storage-file", storage_file.to_str().unwrap()]);

    let output = cmd.output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["token"], "tok-from-store");
}
