//! Basic CLI E2E tests.
//!
//! Invokes CLI commands via cargo run against the dev data directory and
//! verifies exit codes and output shape.

use std::process::Command;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(args: &[&str]) -> (String, String, i32) {
    let output = Command::new("cargo")
        .args(["run", "-p", "twenty-cli", "--quiet", "--"])
        .args(args)
        .env("TWENTY_ENV", "dev")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

#[test]
fn config_list_prints_json() {
    let (stdout, _, code) = run_cli(&["config", "list"]);
    assert_eq!(code, 0);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("config list not JSON");
    assert!(parsed.get("cycle").is_some());
    assert!(parsed.get("notifications").is_some());
}

#[test]
fn config_get_known_key() {
    let (_, _, code) = run_cli(&["config", "get", "cycle.work_min"]);
    assert_eq!(code, 0);
}

#[test]
fn config_get_unknown_key_fails() {
    let (_, _, code) = run_cli(&["config", "get", "no.such.key"]);
    assert_ne!(code, 0);
}

#[test]
fn cycle_status_prints_snapshot() {
    let (stdout, _, code) = run_cli(&["cycle", "status"]);
    assert_eq!(code, 0);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("status not JSON");
    assert_eq!(parsed["type"], "StateSnapshot");
    assert!(parsed.get("remaining_ms").is_some());
}

#[test]
fn stats_today_prints_totals() {
    let (stdout, _, code) = run_cli(&["stats", "today"]);
    assert_eq!(code, 0);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("stats not JSON");
    assert!(parsed.get("phases").is_some());
}
