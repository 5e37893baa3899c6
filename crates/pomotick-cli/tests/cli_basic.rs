//! Basic CLI E2E tests.
//!
//! Tests invoke the built binary with HOME pointed at a temp dir so the
//! config file never touches the real user directory.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(home: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_pomotick"))
        .args(args)
        .env("HOME", home)
        .env_remove("POMOTICK_ENV")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

#[test]
fn test_version() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(home.path(), &["--version"]);
    assert_eq!(code, 0);
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_config_list_is_json_with_defaults() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(home.path(), &["config", "list"]);
    assert_eq!(code, 0, "config list failed");

    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["timer"]["presets"], serde_json::json!([25, 45, 60, 90]));
    assert_eq!(parsed["alarm"]["cutoff_secs"], 5);
    assert!(home.path().join(".config/pomotick/config.toml").exists());
}

#[test]
fn test_config_set_then_get() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(home.path(), &["config", "set", "alarm.volume", "30"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "ok");

    let (stdout, _, code) = run_cli(home.path(), &["config", "get", "alarm.volume"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "30");
}

#[test]
fn test_config_rejects_bad_values() {
    let home = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(home.path(), &["config", "get", "alarm.nope"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));

    let (_, _, code) = run_cli(home.path(), &["config", "set", "alarm.volume", "500"]);
    assert_eq!(code, 1);

    let (stdout, _, _) = run_cli(home.path(), &["config", "get", "alarm.volume"]);
    assert_eq!(stdout.trim(), "70");
}

#[test]
fn test_config_clears_alarm_sound() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(home.path(), &["config", "get", "alarm.sound"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "");

    let (_, _, code) = run_cli(home.path(), &["config", "set", "alarm.sound", "/tmp/a.mp3"]);
    assert_eq!(code, 0);
    let (_, _, code) = run_cli(home.path(), &["config", "set", "alarm.sound", ""]);
    assert_eq!(code, 0);

    let (stdout, _, _) = run_cli(home.path(), &["config", "list"]);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert!(parsed["alarm"]["sound"].is_null());

    let (_, _, code) = run_cli(home.path(), &["config", "set", "alarm.cutoff_secs", "86400"]);
    assert_eq!(code, 1);
}

#[test]
fn test_run_quits_on_q() {
    let home = tempfile::tempdir().unwrap();
    let mut child = Command::new(env!("CARGO_BIN_EXE_pomotick"))
        .args(["run", "--no-update-check", "--minutes", "2"])
        .env("HOME", home.path())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn CLI");

    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"c\n30\nq\n")
        .unwrap();
    let output = child.wait_with_output().unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("02:00"));
    assert!(stdout.contains("[60 min preset]"));
    assert!(stdout.contains("30:00"));
}
