use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

use authflow::config::OAuthConfig;

/// OAuth settings whose endpoints point at `base_url` (typically a
/// wiremock server).
#[allow(dead_code)]
pub fn oauth_config(base_url: &str) -> OAuthConfig {
    OAuthConfig {
        client_id: "test-client-id".to_string(),
        authorization_endpoint: format!("{}/oauth/authorize", base_url),
        token_endpoint: format!("{}/oauth/token", base_url),
        redirect_uri: "http://localhost:4200/callback".to_string(),
        ..OAuthConfig::default()
    }
}

/// The canonical token endpoint response used across tests.
#[allow(dead_code)]
pub fn token_response_body() -> serde_json::Value {
    serde_json::json!({
        "token_type": "bearer",
        "expires_in": 3600,
        "access_token": "tok1",
        "refresh_token": "ref1"
    })
}

/// Value of query parameter `name` in `url`.
#[allow(dead_code)]
pub fn query_param(url: &str, name: &str) -> Option<String> {
    url::Url::parse(url)
        .ok()?
        .query_pairs()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.into_owned())
}

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}
