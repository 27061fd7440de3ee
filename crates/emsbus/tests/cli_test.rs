//! Integration tests for the `emsbus` CLI binary.
//!
//! Argument parsing, help output, completions, config handling, and error
//! exit codes. The one gateway-bound test runs against wiremock.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

const NO_CONFIG_HOME: &str = "/tmp/emsbus-cli-test-nonexistent";

/// Build a [`Command`] for the `emsbus` binary with env isolation.
///
/// Clears all `EMSBUS_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn emsbus_cmd() -> assert_cmd::Command {
    emsbus_cmd_with_home(NO_CONFIG_HOME)
}

fn emsbus_cmd_with_home(home: &str) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("emsbus");
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home)
        .env_remove("EMSBUS_PROFILE")
        .env_remove("EMSBUS_GATEWAY")
        .env_remove("EMSBUS_TOKEN")
        .env_remove("EMSBUS_OUTPUT")
        .env_remove("EMSBUS_INSECURE")
        .env_remove("EMSBUS_TIMEOUT")
        .env_remove("EMSBUS_INTERVAL")
        .env_remove("RUST_LOG");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = emsbus_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    emsbus_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("EMS bus")
            .and(predicate::str::contains("status"))
            .and(predicate::str::contains("watch"))
            .and(predicate::str::contains("scan")),
    );
}

#[test]
fn test_version_flag() {
    emsbus_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("emsbus"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    emsbus_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    emsbus_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let output = emsbus_cmd().arg("foobar").output().unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("unrecognized") || text.contains("foobar"),
        "Expected error mentioning invalid subcommand:\n{text}"
    );
}

#[test]
fn test_status_without_gateway_fails() {
    let output = emsbus_cmd().arg("status").output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    let text = combined_output(&output);
    assert!(
        text.contains("No gateway configured"),
        "Expected missing gateway error:\n{text}"
    );
}

#[test]
fn test_unknown_profile_fails() {
    let output = emsbus_cmd()
        .args(["--profile", "attic", "status"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(text.contains("attic"), "Expected profile name in error:\n{text}");
}

#[test]
fn test_zero_interval_rejected_by_parser() {
    let output = emsbus_cmd()
        .args(["--gateway", "127.0.0.1:9", "--interval", "0", "watch"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_anonymous_scan_is_permission_denied() {
    // No token: refused locally before any request is made.
    let output = emsbus_cmd()
        .args(["--gateway", "http://127.0.0.1:9", "--yes", "scan"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(5), "{}", combined_output(&output));
    let text = combined_output(&output);
    assert!(text.contains("admin"), "Expected admin hint:\n{text}");
}

#[test]
fn test_unreachable_gateway_is_connection_error() {
    let output = emsbus_cmd()
        .args(["--gateway", "http://127.0.0.1:9", "--timeout", "2", "status"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(7), "{}", combined_output(&output));
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_path() {
    emsbus_cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_show_defaults() {
    emsbus_cmd()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("poll_interval = 30"));
}

#[test]
fn test_config_show_masks_token() {
    let home = tempfile::tempdir().unwrap();
    let dir = home.path().join("emsbus");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join("config.toml"),
        r#"
default_profile = "home"

[profiles.home]
gateway = "http://ems-esp.local"
token = "super-secret"
poll_interval = 10
"#,
    )
    .unwrap();

    let output = emsbus_cmd_with_home(home.path().to_str().unwrap())
        .args(["config", "show"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("[profiles.home]"), "{stdout}");
    assert!(stdout.contains("token = \"****\""), "{stdout}");
    assert!(!stdout.contains("super-secret"), "{stdout}");
}

// ── Against a gateway ───────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_status_json_against_gateway() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": 0,
            "uptime": 3661,
            "num_devices": 5,
            "num_sensors": 2,
            "num_analogs": 0,
            "stats": [{ "id": "Boiler", "s": 12345, "f": 10, "q": 99 }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    let output = tokio::task::spawn_blocking(move || {
        emsbus_cmd()
            .args(["--gateway", &uri, "--output", "json", "status"])
            .output()
            .unwrap()
    })
    .await
    .unwrap();

    assert!(output.status.success(), "{}", combined_output(&output));
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["view"], "ready");
    assert_eq!(value["connection_state"], "connected");
    assert_eq!(value["rows"][0]["id"], "Boiler");
}
