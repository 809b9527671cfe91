//! CLI integration tests for tez-cli
//!
//! Tests command parsing, output formatting, fixture and config handling.
//! Nothing here needs a live node.

use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

const FAUCET: &str = r#"{
    "mnemonic": ["shrug", "lecture", "spoil", "buzz", "lake", "solar", "jar", "grant",
                 "patch", "cradle", "pepper", "shallow", "dish", "ribbon", "hungry"],
    "secret": "0c5fa9a3d707acc816d23940efdef01aa071bdc6",
    "amount": "12358548903",
    "pkh": "tz1eMbUHzad9RS1HiiJ7dwFivUyRMqtDbiLg",
    "password": "Pw3xAmpl3",
    "email": "xyzabcde.tezos@tezos.example.org"
}"#;
const FAUCET_PKH: &str = "tz1eMbUHzad9RS1HiiJ7dwFivUyRMqtDbiLg";
const UNREACHABLE_RPC: &str = "http://127.0.0.1:9";

/// Helper to run the CLI inside `dir`, which also serves as HOME
fn run_tez(dir: &Path, args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_tez"))
        .args(args)
        .current_dir(dir)
        .env("HOME", dir)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute command")
}

fn workspace() -> TempDir {
    tempfile::tempdir().unwrap()
}

fn write_fixtures(dir: &Path) {
    std::fs::write(dir.join("faucetA.json"), FAUCET).unwrap();
    std::fs::write(dir.join("faucetB.json"), FAUCET).unwrap();
    std::fs::create_dir_all(dir.join("deployed")).unwrap();
    std::fs::write(
        dir.join("deployed/fa12_latest.json"),
        r#"{"address": "KT18anmnvhqTsgqTwasxpLKYWcLJnGRX3m2D"}"#,
    )
    .unwrap();
}

fn stdout(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

// ==================== Help & Version Tests ====================

#[test]
fn test_cli_help() {
    let dir = workspace();
    let output = run_tez(dir.path(), &["--help"]);
    assert!(output.status.success());
    let out = stdout(&output);
    for command in ["test", "storage", "account", "config"] {
        assert!(out.contains(command), "missing {} in help", command);
    }
    assert!(out.contains("--rpc-url"));
    assert!(out.contains("--log-level"));
}

#[test]
fn test_cli_version() {
    let dir = workspace();
    let output = run_tez(dir.path(), &["--version"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("tez"));
}

#[test]
fn test_cli_unknown_command() {
    let dir = workspace();
    let output = run_tez(dir.path(), &["deploy"]);
    assert!(!output.status.success());
}

// ==================== Account Command Tests ====================

#[test]
fn test_account_from_faucet() {
    let dir = workspace();
    write_fixtures(dir.path());

    let output = run_tez(dir.path(), &["account", "faucetA.json"]);
    assert!(output.status.success(), "{}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains(&format!("Address: {}", FAUCET_PKH)));
    assert!(out.contains("Public key: edpkuafEa2wxjuAUcTmTuRMPyZwUavQaFi2AHfX7pPKuXej7hmujdE"));
}

#[test]
fn test_account_json() {
    let dir = workspace();
    write_fixtures(dir.path());

    let output = run_tez(dir.path(), &["--json", "account", "faucetA.json"]);
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["pkh"], FAUCET_PKH);
    assert_eq!(json["email"], "xyzabcde.tezos@tezos.example.org");
}

#[test]
fn test_account_missing_file() {
    let dir = workspace();
    let output = run_tez(dir.path(), &["account", "faucetA.json"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("fixture faucetA.json"));
}

#[test]
fn test_account_pkh_mismatch() {
    let dir = workspace();
    std::fs::write(dir.path().join("bad.json"), FAUCET.replace("Pw3xAmpl3", "wrong")).unwrap();

    let output = run_tez(dir.path(), &["account", "bad.json"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("setup failed"));
}

// ==================== Config Command Tests ====================

#[test]
fn test_config_show_defaults() {
    let dir = workspace();
    let output = run_tez(dir.path(), &["config", "--show"]);
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("rpc_url = \"https://api.tez.ie/rpc/babylonnet\""));
    assert!(out.contains("deployment = \"deployed/fa12_latest.json\""));
}

#[test]
fn test_config_set_rpc_persists() {
    let dir = workspace();
    let output = run_tez(dir.path(), &["config", "--set-rpc", "http://localhost:8732"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(dir.path().join(".tez-fa12/config.toml").exists());

    let output = run_tez(dir.path(), &["--json", "config", "--show"]);
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["config"]["rpc_url"], "http://localhost:8732");
    assert_eq!(json["config"]["confirmations"], 1);
}

#[test]
fn test_config_explicit_file() {
    let dir = workspace();
    std::fs::write(dir.path().join("custom.toml"), "confirmations = 2\n").unwrap();

    let output = run_tez(dir.path(), &["--json", "--config", "custom.toml", "config", "--show"]);
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["config"]["confirmations"], 2);
    assert_eq!(json["config"]["poll_interval_secs"], 5);
}

#[test]
fn test_config_malformed_file() {
    let dir = workspace();
    std::fs::write(dir.path().join("bad.toml"), "confirmations = [").unwrap();

    let output = run_tez(dir.path(), &["--config", "bad.toml", "config", "--show"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Config error"));
}

// ==================== Test & Storage Command Tests ====================

#[test]
fn test_suite_missing_fixtures_fails_fast() {
    let dir = workspace();
    let output = run_tez(dir.path(), &["--rpc-url", UNREACHABLE_RPC, "test"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("faucetA.json"));
}

#[test]
fn test_suite_unreachable_node() {
    let dir = workspace();
    write_fixtures(dir.path());

    let output = run_tez(dir.path(), &["--json", "--rpc-url", UNREACHABLE_RPC, "test"]);
    assert_eq!(output.status.code(), Some(1));
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["success"], false);
    assert!(json["error"].as_str().unwrap().contains("Transport"));
}

#[test]
fn test_storage_invalid_address() {
    let dir = workspace();
    let output = run_tez(dir.path(), &["storage", "tz1nope"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Invalid address: tz1nope"));
}
