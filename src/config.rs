//! Configuration management for Authflow
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{AuthflowError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Scope requested when none is configured.
pub const DEFAULT_SCOPE: &str = "read_user_data write_user_data";

/// Main configuration structure for Authflow
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Authorization server and client registration
    #[serde(default)]
    pub oauth: OAuthConfig,

    /// Session store settings
    #[serde(default)]
    pub storage: StorageConfig,

    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,
}

/// OAuth client configuration
///
/// Everything the authorization request and the token exchange need to
/// know about the authorization server and this client's registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthConfig {
    /// Public client identifier issued by the authorization server
    #[serde(default)]
    pub client_id: String,

    /// URL the user is sent to for login and consent
    #[serde(default)]
    pub authorization_endpoint: String,

    /// URL used to exchange the authorization code for tokens
    #[serde(default)]
    pub token_endpoint: String,

    /// Redirect URI registered for this client
    #[serde(default)]
    pub redirect_uri: String,

    /// Space-separated scope string sent verbatim
    #[serde(default = "default_scope")]
    pub scope: String,
}

fn default_scope() -> String {
    DEFAULT_SCOPE.to_string()
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            authorization_endpoint: String::new(),
            token_endpoint: String::new(),
            redirect_uri: String::new(),
            scope: default_scope(),
        }
    }
}

/// Session store configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path of the session database. Defaults to the platform data
    /// directory when unset.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// HTTP client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Upper bound on the token exchange, applied by the caller
    #[serde(default = "default_exchange_timeout")]
    pub exchange_timeout_seconds: u64,

    /// User-Agent header sent to the token endpoint
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_exchange_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("authflow/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            exchange_timeout_seconds: default_exchange_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Returns
    ///
    /// Returns the loaded and merged configuration
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(AuthflowError::from)?;
        let config = serde_yaml::from_str(&contents).map_err(AuthflowError::from)?;
        Ok(config)
    }

    fn apply_env_vars(&mut self) {
        if let Ok(client_id) = std::env::var("AUTHFLOW_CLIENT_ID") {
            self.oauth.client_id = client_id;
        }

        if let Ok(endpoint) = std::env::var("AUTHFLOW_AUTHORIZATION_ENDPOINT") {
            self.oauth.authorization_endpoint = endpoint;
        }

        if let Ok(endpoint) = std::env::var("AUTHFLOW_TOKEN_ENDPOINT") {
            self.oauth.token_endpoint = endpoint;
        }

        if let Ok(redirect_uri) = std::env::var("AUTHFLOW_REDIRECT_URI") {
            self.oauth.redirect_uri = redirect_uri;
        }

        if let Ok(scope) = std::env::var("AUTHFLOW_SCOPE") {
            self.oauth.scope = scope;
        }

        if let Ok(path) = std::env::var("AUTHFLOW_STORE_PATH") {
            self.storage.path = Some(PathBuf::from(path));
        }

        if let Ok(timeout) = std::env::var("AUTHFLOW_EXCHANGE_TIMEOUT_SECONDS") {
            if let Ok(value) = timeout.parse() {
                self.http.exchange_timeout_seconds = value;
            } else {
                tracing::warn!("Invalid AUTHFLOW_EXCHANGE_TIMEOUT_SECONDS: {}", timeout);
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(path) = &cli.store_path {
            tracing::debug!("Using session store override from CLI: {}", path);
            self.storage.path = Some(PathBuf::from(path));
        }
    }

    /// Validate the configuration
    ///
    /// Ensures the OAuth endpoints are usable absolute URLs and that the
    /// remaining values are within acceptable ranges.
    ///
    /// # Errors
    ///
    /// Returns [`AuthflowError::Config`] describing the first failing check
    pub fn validate(&self) -> Result<()> {
        if self.oauth.client_id.trim().is_empty() {
            return Err(
                AuthflowError::Config("oauth.client_id cannot be empty".to_string()).into(),
            );
        }

        validate_http_url("oauth.authorization_endpoint", &self.oauth.authorization_endpoint)?;
        validate_http_url("oauth.token_endpoint", &self.oauth.token_endpoint)?;
        validate_http_url("oauth.redirect_uri", &self.oauth.redirect_uri)?;

        if self.oauth.scope.trim().is_empty() {
            return Err(AuthflowError::Config("oauth.scope cannot be empty".to_string()).into());
        }

        if self.http.exchange_timeout_seconds == 0 {
            return Err(AuthflowError::Config(
                "http.exchange_timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        Ok(())
    }
}

fn validate_http_url(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(AuthflowError::Config(format!("{field} cannot be empty")).into());
    }

    let url = Url::parse(value)
        .map_err(|e| AuthflowError::Config(format!("{field} is not a valid URL: {e}")))?;

    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(AuthflowError::Config(format!(
            "{field} must use http or https, got: {other}"
        ))
        .into()),
    }
}
