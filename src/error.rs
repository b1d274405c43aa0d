//! Error types for Authflow
//!
//! This module defines all error types used throughout the crate, using
//! `thiserror` for ergonomic error handling.
//!
//! Two errors form the typed contract of the authorization flow itself:
//! [`StateMismatch`] (callback validation) and [`TransportError`] (token
//! exchange). Everything else is carried by [`AuthflowError`] through the
//! `anyhow`-based [`Result`] alias.

use thiserror::Error;

/// The `state` returned on the callback does not match the pending request.
///
/// Also returned when no pending request has been persisted, or when its
/// data cannot be read back.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("state mismatch in OAuth callback")]
pub struct StateMismatch;

/// Failure while talking to the token endpoint.
#[derive(Error, Debug)]
pub enum TransportError {
    /// The request never produced a response (DNS, connect, TLS, ...)
    #[error("token request failed: {0}")]
    Request(String),

    /// The token endpoint answered with a non-success status
    #[error("token endpoint returned {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Raw response body, kept for diagnostics
        body: String,
    },

    /// The response body is not a usable token response
    #[error("failed to parse token response: {0}")]
    Decode(String),
}

/// Main error type for Authflow operations
#[derive(Error, Debug)]
pub enum AuthflowError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Persistent store errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Authentication errors
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Callback state did not match the pending request
    #[error(transparent)]
    StateMismatch(#[from] StateMismatch),

    /// Token endpoint failure
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type alias for Authflow operations
///
/// Uses `anyhow::Error` so callers get rich context and `?` works across
/// module boundaries. Downcast to [`AuthflowError`] to inspect the cause.
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let error = AuthflowError::Config("missing client_id".to_string());
        assert_eq!(error.to_string(), "Configuration error: missing client_id");
    }

    #[test]
    fn test_storage_error_display() {
        let error = AuthflowError::Storage("database locked".to_string());
        assert_eq!(error.to_string(), "Storage error: database locked");
    }

    #[test]
    fn test_state_mismatch_display() {
        assert_eq!(StateMismatch.to_string(), "state mismatch in OAuth callback");
        let error: AuthflowError = StateMismatch.into();
        assert_eq!(error.to_string(), "state mismatch in OAuth callback");
    }

    #[test]
    fn test_transport_status_display() {
        let error = TransportError::Status {
            status: 400,
            body: "invalid_grant".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "token endpoint returned 400: invalid_grant"
        );
    }

    #[test]
    fn test_transport_error_conversion() {
        let error: AuthflowError = TransportError::Decode("eof".to_string()).into();
        assert!(matches!(
            error,
            AuthflowError::Transport(TransportError::Decode(_))
        ));
        assert!(error.to_string().starts_with("Transport error:"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: AuthflowError = io_error.into();
        assert!(matches!(error, AuthflowError::Io(_)));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_error = serde_json::from_str::<serde_json::Value>("{invalid json}").unwrap_err();
        let error: AuthflowError = json_error.into();
        assert!(matches!(error, AuthflowError::Serialization(_)));
    }

    #[test]
    fn test_yaml_error_conversion() {
        let yaml_error = serde_yaml::from_str::<serde_yaml::Value>("invalid: : yaml").unwrap_err();
        let error: AuthflowError = yaml_error.into();
        assert!(matches!(error, AuthflowError::Yaml(_)));
    }

    #[test]
    fn test_downcast_from_anyhow() {
        let result: Result<()> = Err(AuthflowError::from(StateMismatch).into());
        let err = result.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AuthflowError>(),
            Some(AuthflowError::StateMismatch(_))
        ));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<AuthflowError>();
        assert_send_sync::<TransportError>();
        assert_send_sync::<StateMismatch>();
    }
}
