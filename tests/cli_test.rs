//! CLI integration tests
//!
//! Runs the `authflow` binary against a temporary config file and session
//! store. Each invocation is a separate process, so these tests also cover
//! the pending login surviving between `login` and `callback`.

mod common;

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_yaml(base_url: &str) -> String {
    format!(
        "oauth:\n  client_id: cli-client\n  authorization_endpoint: {base}/oauth/authorize\n  token_endpoint: {base}/oauth/token\n  redirect_uri: http://localhost:4200/callback\nhttp:\n  exchange_timeout_seconds: 5\n",
        base = base_url
    )
}

fn authflow(config_path: &Path, store_path: &Path) -> Command {
    let mut cmd = Command::cargo_bin("authflow").unwrap();
    cmd.env("NO_COLOR", "1")
        .env_remove("AUTHFLOW_CLIENT_ID")
        .env_remove("AUTHFLOW_AUTHORIZATION_ENDPOINT")
        .env_remove("AUTHFLOW_TOKEN_ENDPOINT")
        .env_remove("AUTHFLOW_REDIRECT_URI")
        .env_remove("AUTHFLOW_SCOPE")
        .env_remove("AUTHFLOW_STORE_PATH")
        .env_remove("AUTHFLOW_EXCHANGE_TIMEOUT_SECONDS")
        .arg("--config")
        .arg(config_path)
        .arg("--store-path")
        .arg(store_path);
    cmd
}

/// Pulls the authorization URL out of `login` output.
fn login_url(stdout: &[u8]) -> String {
    let text = String::from_utf8_lossy(stdout);
    let line = text
        .lines()
        .find(|l| l.contains("response_type=code"))
        .expect("authorization URL in output");
    let start = line.find("http").expect("URL scheme");
    line[start..]
        .split(|c: char| c.is_whitespace() || c == '\u{1b}')
        .next()
        .unwrap()
        .to_string()
}

#[test]
fn test_invalid_config_missing_client_id() {
    let (temp_dir, config_path) = common::temp_config_file(
        "oauth:\n  authorization_endpoint: https://auth.example.com/a\n  token_endpoint: https://auth.example.com/t\n  redirect_uri: http://localhost/cb\n",
    );

    authflow(&config_path, &temp_dir.path().join("session.db"))
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("oauth.client_id cannot be empty"));
}

#[test]
fn test_login_prints_authorization_url() {
    let (temp_dir, config_path) =
        common::temp_config_file(&config_yaml("https://auth.example.com"));
    let store_path = temp_dir.path().join("session.db");

    let output = authflow(&config_path, &store_path)
        .arg("login")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "https://auth.example.com/oauth/authorize?response_type=code&state=",
        ))
        .stdout(predicate::str::contains("&client_id=cli-client&"))
        .stdout(predicate::str::contains("code_challenge_method=S256"))
        .get_output()
        .stdout
        .clone();

    let url = login_url(&output);
    assert_eq!(common::query_param(&url, "state").unwrap().len(), 40);
}

#[test]
fn test_status_when_logged_out() {
    let (temp_dir, config_path) =
        common::temp_config_file(&config_yaml("https://auth.example.com"));

    authflow(&config_path, &temp_dir.path().join("session.db"))
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Not authenticated"));
}

#[test]
fn test_callback_with_wrong_state_fails() {
    let (temp_dir, config_path) =
        common::temp_config_file(&config_yaml("https://auth.example.com"));
    let store_path = temp_dir.path().join("session.db");

    authflow(&config_path, &store_path)
        .arg("login")
        .assert()
        .success();

    authflow(&config_path, &store_path)
        .args(["callback", "--code", "abc", "--state", "wrong"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Login rejected"));

    authflow(&config_path, &store_path)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Not authenticated"));
}

#[test]
fn test_callback_surfaces_authorization_server_error() {
    let (temp_dir, config_path) =
        common::temp_config_file(&config_yaml("https://auth.example.com"));

    authflow(&config_path, &temp_dir.path().join("session.db"))
        .args([
            "callback",
            "--url",
            "http://localhost:4200/callback?error=access_denied&state=x",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("access_denied"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_login_callback_status_logout_across_processes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::token_response_body()))
        .expect(1)
        .mount(&server)
        .await;

    let (temp_dir, config_path) = common::temp_config_file(&config_yaml(&server.uri()));
    let store_path = temp_dir.path().join("session.db");

    tokio::task::spawn_blocking(move || {
        let output = authflow(&config_path, &store_path)
            .arg("login")
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        let state = common::query_param(&login_url(&output), "state").unwrap();
        let redirect = format!("http://localhost:4200/callback?code=abc&state={}", state);

        authflow(&config_path, &store_path)
            .args(["callback", "--url", &redirect])
            .assert()
            .success()
            .stdout(predicate::str::contains("Logged in"));

        authflow(&config_path, &store_path)
            .args(["status", "--json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"is_authenticated\": true"))
            .stdout(predicate::str::contains("tok1").not())
            .stdout(predicate::str::contains("ref1").not());

        authflow(&config_path, &store_path)
            .arg("logout")
            .assert()
            .success()
            .stdout(predicate::str::contains("Logged out"));

        authflow(&config_path, &store_path)
            .arg("status")
            .assert()
            .success()
            .stdout(predicate::str::contains("Not authenticated"));

        drop(temp_dir);
    })
    .await
    .unwrap();
}
