//! Authorization request construction
//!
//! Builds the URL the user is sent to for login and consent, and records
//! the secrets of that pending request in the store so the callback can be
//! validated and the code redeemed later.
//!
//! Only one pending request exists at a time: building a new URL overwrites
//! the previous `state` and `code_verifier`, silently invalidating any
//! login started earlier.

use std::sync::Arc;

use serde_json::Value;

use crate::auth::{pkce, random};
use crate::config::OAuthConfig;
use crate::error::Result;
use crate::store::{keys, KeyValueStore};

/// Length of the anti-CSRF `state` value.
pub const STATE_LENGTH: usize = 40;

/// Length of the PKCE `code_verifier` (the RFC 7636 maximum).
pub const CODE_VERIFIER_LENGTH: usize = 128;

/// Builds authorization URLs and persists the pending request.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use authflow::auth::request::AuthorizationRequestBuilder;
/// use authflow::config::OAuthConfig;
/// use authflow::store::MemoryStore;
///
/// let config = OAuthConfig {
///     client_id: "my-client".to_string(),
///     authorization_endpoint: "https://auth.example.com/oauth/authorize".to_string(),
///     token_endpoint: "https://auth.example.com/oauth/token".to_string(),
///     redirect_uri: "http://localhost:4200/callback".to_string(),
///     ..OAuthConfig::default()
/// };
/// let builder = AuthorizationRequestBuilder::new(config, Arc::new(MemoryStore::new()));
///
/// let url = builder.build_login_url().unwrap();
/// assert!(url.starts_with("https://auth.example.com/oauth/authorize?response_type=code&state="));
/// assert!(url.contains("code_challenge_method=S256"));
/// ```
#[derive(Debug, Clone)]
pub struct AuthorizationRequestBuilder {
    config: OAuthConfig,
    store: Arc<dyn KeyValueStore>,
}

impl AuthorizationRequestBuilder {
    /// Creates a builder for the given client configuration.
    pub fn new(config: OAuthConfig, store: Arc<dyn KeyValueStore>) -> Self {
        Self { config, store }
    }

    /// Starts a new authorization request and returns its URL.
    ///
    /// Generates a fresh `state` and `code_verifier`, persists both in one
    /// write (replacing any earlier pending request), and assembles the
    /// URL with these query parameters in order: `response_type`, `state`,
    /// `client_id`, `scope`, `code_challenge`, `code_challenge_method`,
    /// `redirect_uri`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::AuthflowError::Storage`] if the pending request
    /// cannot be persisted. No URL is returned in that case, since its
    /// callback could never be validated.
    pub fn build_login_url(&self) -> Result<String> {
        let state = random::generate(STATE_LENGTH);
        let code_verifier = random::generate(CODE_VERIFIER_LENGTH);

        self.store.set_all(&[
            (keys::STATE, Value::String(state.clone())),
            (keys::CODE_VERIFIER, Value::String(code_verifier.clone())),
        ])?;

        let code_challenge = pkce::challenge(&code_verifier);

        let params = [
            "response_type=code".to_string(),
            format!("state={}", state),
            format!("client_id={}", urlencoding::encode(&self.config.client_id)),
            format!("scope={}", urlencoding::encode(&self.config.scope)),
            format!("code_challenge={}", code_challenge),
            format!("code_challenge_method={}", pkce::CHALLENGE_METHOD),
            format!(
                "redirect_uri={}",
                urlencoding::encode(&self.config.redirect_uri)
            ),
        ];

        let separator = if self.config.authorization_endpoint.contains('?') {
            '&'
        } else {
            '?'
        };

        tracing::debug!(
            state_len = state.len(),
            verifier_len = code_verifier.len(),
            "Started authorization request"
        );

        Ok(format!(
            "{}{}{}",
            self.config.authorization_endpoint,
            separator,
            params.join("&")
        ))
    }
}
