//! Authorization code exchange
//!
//! Redeems a [`ValidatedCode`] at the token endpoint. The `code_verifier`
//! sent here is the one persisted with the pending request; the server
//! recomputes its S256 challenge to confirm the caller started the flow.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::auth::callback::ValidatedCode;
use crate::config::OAuthConfig;
use crate::error::TransportError;
use crate::transport::HttpTransport;

/// Token endpoint response.
///
/// `refresh_token` defaults to an empty string when the server omits it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Token type, typically `"bearer"`
    pub token_type: String,
    /// Access token lifetime in seconds
    pub expires_in: u64,
    /// Access token
    pub access_token: String,
    /// Refresh token
    #[serde(default)]
    pub refresh_token: String,
}

impl fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenResponse")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

/// Exchanges authorization codes for tokens.
#[derive(Debug, Clone)]
pub struct TokenExchangeClient {
    config: OAuthConfig,
    transport: Arc<dyn HttpTransport>,
}

impl TokenExchangeClient {
    /// Creates a client posting to `config.token_endpoint` through
    /// `transport`.
    pub fn new(config: OAuthConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self { config, transport }
    }

    /// Exchanges a validated authorization code for tokens.
    ///
    /// Sends `grant_type=authorization_code`, `code`, `code_verifier`,
    /// `redirect_uri` and `client_id` as a form-encoded POST. Nothing is
    /// retried.
    ///
    /// # Errors
    ///
    /// - [`TransportError::Request`] if the transport produced no response.
    /// - [`TransportError::Status`] for a non-2xx status.
    /// - [`TransportError::Decode`] if the body is not a token response or
    ///   carries an empty `access_token`.
    pub async fn exchange(
        &self,
        validated: &ValidatedCode,
    ) -> Result<TokenResponse, TransportError> {
        let form = [
            ("grant_type", "authorization_code"),
            ("code", validated.code()),
            ("code_verifier", validated.code_verifier()),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("client_id", self.config.client_id.as_str()),
        ];

        let resp = self
            .transport
            .post_form(&self.config.token_endpoint, &form)
            .await?;

        if !resp.is_success() {
            tracing::warn!(status = resp.status, "Token exchange rejected");
            return Err(TransportError::Status {
                status: resp.status,
                body: resp.body,
            });
        }

        let tokens: TokenResponse = serde_json::from_str(&resp.body)
            .map_err(|e| TransportError::Decode(e.to_string()))?;

        if tokens.access_token.is_empty() {
            return Err(TransportError::Decode(
                "access_token is empty".to_string(),
            ));
        }

        tracing::info!(
            token_type = %tokens.token_type,
            expires_in = tokens.expires_in,
            "Authorization code exchanged"
        );
        Ok(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::HttpResponse;
    use std::sync::Mutex;

    /// Records every request and answers with a canned response.
    #[derive(Debug)]
    struct RecordingTransport {
        response: Mutex<Option<Result<HttpResponse, TransportError>>>,
        requests: Mutex<Vec<(String, Vec<(String, String)>)>>,
    }

    impl RecordingTransport {
        fn replying(status: u16, body: &str) -> Arc<Self> {
            Self::with(Ok(HttpResponse {
                status,
                body: body.to_string(),
            }))
        }

        fn with(response: Result<HttpResponse, TransportError>) -> Arc<Self> {
            Arc::new(Self {
                response: Mutex::new(Some(response)),
                requests: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait::async_trait]
    impl HttpTransport for RecordingTransport {
        async fn post_form(
            &self,
            url: &str,
            form: &[(&str, &str)],
        ) -> Result<HttpResponse, TransportError> {
            self.requests.lock().unwrap().push((
                url.to_string(),
                form.iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            ));
            self.response
                .lock()
                .unwrap()
                .take()
                .expect("transport called more than once")
        }
    }

    fn config() -> OAuthConfig {
        OAuthConfig {
            client_id: "client-123".to_string(),
            authorization_endpoint: "https://auth.example.com/oauth/authorize".to_string(),
            token_endpoint: "https://auth.example.com/oauth/token".to_string(),
            redirect_uri: "http://localhost:4200/callback".to_string(),
            ..OAuthConfig::default()
        }
    }

    const TOKEN_BODY: &str = r#"{"token_type":"bearer","expires_in":3600,"access_token":"tok1","refresh_token":"ref1"}"#;

    #[tokio::test]
    async fn test_exchange_sends_expected_form() {
        let transport = RecordingTransport::replying(200, TOKEN_BODY);
        let client = TokenExchangeClient::new(config(), transport.clone());

        client
            .exchange(&ValidatedCode::new("abc", "V1"))
            .await
            .unwrap();

        let requests = transport.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        let (url, form) = &requests[0];
        assert_eq!(url, "https://auth.example.com/oauth/token");

        let expected: Vec<(String, String)> = [
            ("grant_type", "authorization_code"),
            ("code", "abc"),
            ("code_verifier", "V1"),
            ("redirect_uri", "http://localhost:4200/callback"),
            ("client_id", "client-123"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        assert_eq!(form, &expected);
    }

    #[tokio::test]
    async fn test_exchange_parses_token_response() {
        let client =
            TokenExchangeClient::new(config(), RecordingTransport::replying(200, TOKEN_BODY));

        let tokens = client
            .exchange(&ValidatedCode::new("abc", "V1"))
            .await
            .unwrap();

        assert_eq!(
            tokens,
            TokenResponse {
                token_type: "bearer".to_string(),
                expires_in: 3600,
                access_token: "tok1".to_string(),
                refresh_token: "ref1".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_missing_refresh_token_defaults_to_empty() {
        let body = r#"{"token_type":"bearer","expires_in":60,"access_token":"tok1"}"#;
        let client = TokenExchangeClient::new(config(), RecordingTransport::replying(200, body));

        let tokens = client
            .exchange(&ValidatedCode::new("abc", "V1"))
            .await
            .unwrap();
        assert!(tokens.refresh_token.is_empty());
    }

    #[tokio::test]
    async fn test_non_success_status_is_status_error() {
        let client = TokenExchangeClient::new(
            config(),
            RecordingTransport::replying(400, r#"{"error":"invalid_grant"}"#),
        );

        let err = client
            .exchange(&ValidatedCode::new("abc", "V1"))
            .await
            .unwrap_err();
        match err {
            TransportError::Status { status, body } => {
                assert_eq!(status, 400);
                assert!(body.contains("invalid_grant"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let client =
            TokenExchangeClient::new(config(), RecordingTransport::replying(200, "<html>"));
        let err = client
            .exchange(&ValidatedCode::new("abc", "V1"))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Decode(_)));
    }

    #[tokio::test]
    async fn test_empty_access_token_is_decode_error() {
        let body = r#"{"token_type":"bearer","expires_in":60,"access_token":""}"#;
        let client = TokenExchangeClient::new(config(), RecordingTransport::replying(200, body));
        let err = client
            .exchange(&ValidatedCode::new("abc", "V1"))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Decode(_)));
    }

    #[tokio::test]
    async fn test_request_failure_is_surfaced_unmodified() {
        let client = TokenExchangeClient::new(
            config(),
            RecordingTransport::with(Err(TransportError::Request("connection refused".into()))),
        );
        let err = client
            .exchange(&ValidatedCode::new("abc", "V1"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "token request failed: connection refused");
    }

    #[test]
    fn test_token_response_debug_redacts_tokens() {
        let tokens: TokenResponse = serde_json::from_str(TOKEN_BODY).unwrap();
        let rendered = format!("{tokens:?}");
        assert!(!rendered.contains("tok1"));
        assert!(!rendered.contains("ref1"));
        assert!(rendered.contains("bearer"));
    }
}
