//! Integration tests for the `homelink` CLI binary.
//!
//! Every test points `--config` at a temp file and pins the network
//! identifier, so nothing touches the user's configuration or Wi-Fi.
#![allow(clippy::unwrap_used)]

use std::net::TcpListener;
use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

const HOME_PROFILE: &str = r#"
default_profile = "home"

[profiles.home]
internal_url = "http://10.0.0.5:8123/"
external_url = "https://example.duckdns.org/"
webhook_id = "abc123"
webhook_secret = "s3cret"
trusted_networks = ["HomeWifi"]
active_endpoint = "internal"
"#;

/// Build a [`Command`] for the `homelink` binary with env isolation.
fn homelink_cmd(config: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("homelink");
    cmd.env("HOME", "/tmp/homelink-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/homelink-cli-test-nonexistent")
        .env("HOMELINK_NETWORK", "")
        .env_remove("HOMELINK_PROFILE")
        .env_remove("HOMELINK_OUTPUT")
        .env_remove("RUST_LOG")
        .arg("--config")
        .arg(config);
    cmd
}

fn write_config(contents: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, contents).unwrap();
    (dir, path)
}

fn read_config(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap()
}

/// A loopback URL nothing is listening on.
fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}/")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let (_dir, path) = write_config("");
    let output = homelink_cmd(&path).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_help_lists_commands() {
    let (_dir, path) = write_config("");
    homelink_cmd(&path).arg("--help").assert().success().stdout(
        predicate::str::contains("status")
            .and(predicate::str::contains("ping"))
            .and(predicate::str::contains("adapt")),
    );
}

#[test]
fn test_completions_zsh() {
    let (_dir, path) = write_config("");
    homelink_cmd(&path)
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

#[test]
fn test_config_path_honors_flag() {
    let (_dir, path) = write_config("");
    homelink_cmd(&path)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains(path.to_string_lossy().as_ref()));
}

// ── Profiles ────────────────────────────────────────────────────────

#[test]
fn test_missing_profile_exits_not_found() {
    let (_dir, path) = write_config("");
    homelink_cmd(&path)
        .arg("status")
        .assert()
        .code(4)
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_config_use_unknown_profile() {
    let (_dir, path) = write_config(HOME_PROFILE);
    homelink_cmd(&path)
        .args(["config", "use", "cabin"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("home"));
}

#[test]
fn test_config_show_masks_secret() {
    let (_dir, path) = write_config(HOME_PROFILE);
    homelink_cmd(&path)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("webhook_secret = \"****\"")
                .and(predicate::str::contains("s3cret").not()),
        );
}

// ── Endpoint selection ──────────────────────────────────────────────

#[test]
fn test_url_on_trusted_network_is_internal() {
    let (_dir, path) = write_config(HOME_PROFILE);
    homelink_cmd(&path)
        .args(["--network", "HomeWifi", "url", "--api"])
        .assert()
        .success()
        .stdout("http://10.0.0.5:8123/api\n");
}

#[test]
fn test_leaving_home_switches_and_persists() {
    let (_dir, path) = write_config(HOME_PROFILE);
    homelink_cmd(&path)
        .args(["--network", "CoffeeShopWifi", "url"])
        .assert()
        .success()
        .stdout("https://example.duckdns.org\n");

    assert!(read_config(&path).contains("active_endpoint = \"external\""));
}

#[test]
fn test_no_endpoint_exits_nine() {
    let (_dir, path) = write_config(
        r#"
[profiles.default]
webhook_id = "abc123"
active_endpoint = "external"
"#,
    );
    homelink_cmd(&path)
        .arg("url")
        .assert()
        .code(9)
        .stderr(predicate::str::contains("address set"));
}

#[test]
fn test_status_json() {
    let (_dir, path) = write_config(HOME_PROFILE);
    let output = homelink_cmd(&path)
        .args(["--network", "HomeWifi", "-o", "json", "status"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let status: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(status["active_endpoint"], "internal");
    assert_eq!(status["active_url"], "http://10.0.0.5:8123");
    assert_eq!(status["on_trusted_network"], true);
    assert_eq!(status["endpoints"].as_array().unwrap().len(), 3);
}

// ── Mutations ───────────────────────────────────────────────────────

#[test]
fn test_address_set_and_invalid_url() {
    let (_dir, path) = write_config(HOME_PROFILE);
    homelink_cmd(&path)
        .args(["address", "set", "remote-ui", "https://rl.example.com/"])
        .assert()
        .success();
    assert!(read_config(&path).contains("remote_relay_url = \"https://rl.example.com/\""));

    homelink_cmd(&path)
        .args(["address", "set", "external", "example.duckdns.org"])
        .assert()
        .code(2);
}

#[test]
fn test_webhook_secret_set_and_clear() {
    let (_dir, path) = write_config(HOME_PROFILE);
    homelink_cmd(&path)
        .args(["webhook", "set", "--secret", "n3w-secret"])
        .assert()
        .success();
    assert!(read_config(&path).contains("webhook_secret = \"n3w-secret\""));

    let output = homelink_cmd(&path)
        .args(["-o", "json", "webhook", "url"])
        .output()
        .unwrap();
    let view: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(view["secret_configured"], true);
    assert!(!String::from_utf8_lossy(&output.stdout).contains("n3w-secret"));

    homelink_cmd(&path)
        .args(["webhook", "set", "--secret", ""])
        .assert()
        .success();
    assert!(!read_config(&path).contains("webhook_secret"));
}

#[test]
fn test_cloud_on_moves_to_relay_off_network() {
    let (_dir, path) = write_config(HOME_PROFILE);
    homelink_cmd(&path)
        .args(["address", "set", "remote", "https://rl.example.com/"])
        .assert()
        .success();
    homelink_cmd(&path)
        .args(["--network", "CoffeeShopWifi", "cloud", "on"])
        .assert()
        .success();

    let saved = read_config(&path);
    assert!(saved.contains("use_cloud_relay = true"));
    assert!(saved.contains("active_endpoint = \"remote_relay\""));
}

#[test]
fn test_networks_add_list_remove() {
    let (_dir, path) = write_config(HOME_PROFILE);
    homelink_cmd(&path)
        .args(["networks", "add", "Cabin"])
        .assert()
        .success();
    homelink_cmd(&path)
        .args(["-o", "plain", "networks", "list"])
        .assert()
        .success()
        .stdout("Cabin\nHomeWifi\n");
    homelink_cmd(&path)
        .args(["networks", "remove", "Garage"])
        .assert()
        .code(2);
}

#[test]
fn test_adapt_rewrites_onto_active_endpoint() {
    let (_dir, path) = write_config(HOME_PROFILE);
    homelink_cmd(&path)
        .args([
            "--network",
            "CoffeeShopWifi",
            "adapt",
            "http://10.0.0.5:8123/api/states/light.kitchen?x=1",
        ])
        .assert()
        .success()
        .stdout("https://example.duckdns.org/api/states/light.kitchen?x=1\n");
}

// ── Ping with failover ──────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_ping_fails_over_from_dead_relay() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let relay = closed_port_url();
    let (_dir, config) = write_config(&format!(
        r#"
[profiles.default]
external_url = "{external}/"
remote_relay_url = "{relay}"
webhook_id = "abc123"
use_cloud_relay = true
active_endpoint = "remote_relay"
"#,
        external = server.uri(),
    ));

    homelink_cmd(&config)
        .args(["-o", "plain", "ping", "--timeout", "5"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains(format!("{relay} failed"))
                .and(predicate::str::contains(format!("{}/ 200", server.uri()))),
        );

    assert!(read_config(&config).contains("active_endpoint = \"external\""));
}

#[test]
fn test_ping_without_alternative_exits_connection() {
    let (_dir, config) = write_config(&format!(
        r#"
[profiles.default]
remote_relay_url = "{}"
webhook_id = "abc123"
use_cloud_relay = true
active_endpoint = "remote_relay"
"#,
        closed_port_url()
    ));

    homelink_cmd(&config)
        .args(["ping", "--timeout", "5"])
        .assert()
        .code(7);
}

#[test]
fn test_ping_stops_when_trusted_internal_is_down() {
    let internal = closed_port_url();
    let external = closed_port_url();
    let (_dir, config) = write_config(&format!(
        r#"
[profiles.default]
internal_url = "{internal}"
external_url = "{external}"
webhook_id = "abc123"
trusted_networks = ["HomeWifi"]
active_endpoint = "internal"
"#
    ));

    homelink_cmd(&config)
        .args(["--network", "HomeWifi", "-o", "plain", "ping", "--timeout", "2"])
        .timeout(std::time::Duration::from_secs(20))
        .assert()
        .code(7)
        .stdout(predicate::str::contains(format!("{internal} failed")));
}
