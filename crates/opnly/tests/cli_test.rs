//! Integration tests for the `opnly` CLI binary.
//!
//! Argument parsing, help output, completions and config handling run
//! without an appliance; rule commands run against a wiremock server.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `opnly` binary with env isolation.
///
/// Clears all `OPNLY_*` env vars and points config directories at `home`
/// so tests never touch the user's real configuration.
fn opnly_cmd(home: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("opnly");
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("OPNLY_PROFILE")
        .env_remove("OPNLY_CONTROLLER")
        .env_remove("OPNLY_API_KEY")
        .env_remove("OPNLY_API_SECRET")
        .env_remove("OPNLY_OUTPUT")
        .env_remove("OPNLY_INSECURE")
        .env_remove("OPNLY_TIMEOUT");
    cmd
}

/// `opnly_cmd` pointed at a mock appliance through flags alone.
fn appliance_cmd(home: &Path, server: &MockServer) -> assert_cmd::Command {
    let mut cmd = opnly_cmd(home);
    cmd.args([
        "--controller",
        &server.uri(),
        "--api-key",
        "key",
        "--api-secret",
        "secret",
    ]);
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

async fn mount_rules(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/firewall/filter/searchRule"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"rows": [
            {"uuid": "r2", "action": "Block", "interface": "wan", "enabled": "1",
             "sequence": "20", "description": "drop telnet"},
            {"uuid": "r1", "action": "Pass", "interface": "lan", "enabled": "1",
             "sequence": "10", "description": "allow lan"},
            {"uuid": "lockout", "action": "Pass", "interface": "lan", "enabled": "1",
             "sequence": "1", "origin": "anti-lockout"}
        ]})))
        .mount(server)
        .await;
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let home = TempDir::new().unwrap();
    let output = opnly_cmd(home.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_lists_commands() {
    let home = TempDir::new().unwrap();
    opnly_cmd(home.path()).arg("--help").assert().success().stdout(
        predicate::str::contains("OPNsense")
            .and(predicate::str::contains("status"))
            .and(predicate::str::contains("rules"))
            .and(predicate::str::contains("interfaces")),
    );
}

#[test]
fn test_version_flag() {
    let home = TempDir::new().unwrap();
    opnly_cmd(home.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("opnly"));
}

#[test]
fn test_completions_bash() {
    let home = TempDir::new().unwrap();
    opnly_cmd(home.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_rules_create_requires_interface() {
    let home = TempDir::new().unwrap();
    opnly_cmd(home.path())
        .args(["rules", "create", "--protocol", "tcp"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--interface"));
}

// ── Configuration ───────────────────────────────────────────────────

#[test]
fn test_status_without_config_points_at_init() {
    let home = TempDir::new().unwrap();
    opnly_cmd(home.path())
        .arg("status")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("config init"));
}

#[test]
fn test_config_show_masks_secrets() {
    let home = TempDir::new().unwrap();
    let dir = home.path().join("opnly");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join("config.toml"),
        "default_profile = \"home\"\n\n\
         [profiles.home]\n\
         controller = \"https://fw.lan\"\n\
         api_key = \"AbCdEf\"\n\
         api_secret = \"hunter2\"\n",
    )
    .unwrap();

    opnly_cmd(home.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("[profiles.home]")
                .and(predicate::str::contains("https://fw.lan"))
                .and(predicate::str::contains("hunter2").not())
                .and(predicate::str::contains("AbCdEf").not()),
        );
}

#[test]
fn test_config_use_unknown_profile_fails() {
    let home = TempDir::new().unwrap();
    opnly_cmd(home.path())
        .args(["config", "use", "office"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("office"));
}

// ── Against a mock appliance ────────────────────────────────────────

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_rules_list_is_sorted_by_sequence() {
    let server = MockServer::start().await;
    mount_rules(&server).await;
    let home = TempDir::new().unwrap();

    appliance_cmd(home.path(), &server)
        .args(["rules", "list", "-o", "plain"])
        .assert()
        .success()
        .stdout("lockout\nr1\nr2\n");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_rules_list_filters_by_interface() {
    let server = MockServer::start().await;
    mount_rules(&server).await;
    let home = TempDir::new().unwrap();

    appliance_cmd(home.path(), &server)
        .args(["rules", "list", "--interface", "WAN", "-o", "plain"])
        .assert()
        .success()
        .stdout("r2\n");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_rules_get_unknown_id_exits_not_found() {
    let server = MockServer::start().await;
    mount_rules(&server).await;
    let home = TempDir::new().unwrap();

    appliance_cmd(home.path(), &server)
        .args(["rules", "get", "missing"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("rules list"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_rules_delete_needs_yes_without_terminal() {
    let server = MockServer::start().await;
    mount_rules(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/firewall/filter/delRule/r1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": "deleted"})))
        .expect(0)
        .mount(&server)
        .await;
    let home = TempDir::new().unwrap();

    appliance_cmd(home.path(), &server)
        .args(["rules", "delete", "r1"])
        .write_stdin("")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--yes"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_rules_toggle_and_apply() {
    let server = MockServer::start().await;
    mount_rules(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/firewall/filter/toggleRule/r1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": "Disabled"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/firewall/filter/apply"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .expect(1)
        .mount(&server)
        .await;
    let home = TempDir::new().unwrap();

    appliance_cmd(home.path(), &server)
        .args(["rules", "toggle", "r1", "--apply"])
        .assert()
        .success()
        .stderr(predicate::str::contains("r1 disabled").and(predicate::str::contains("applied")));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_rules_toggle_read_only_rule_is_refused() {
    let server = MockServer::start().await;
    mount_rules(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/firewall/filter/toggleRule/lockout"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": "Disabled"})))
        .expect(0)
        .mount(&server)
        .await;
    let home = TempDir::new().unwrap();

    appliance_cmd(home.path(), &server)
        .args(["rules", "toggle", "lockout"])
        .assert()
        .code(5);
}
