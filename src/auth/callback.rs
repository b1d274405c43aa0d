//! Authorization callback validation
//!
//! The authorization server redirects back with `code` and `state`. Before
//! the code may be redeemed, `state` must equal the value persisted when
//! the request was built; otherwise the callback may be forged and the flow
//! stops here, before any network call.

use std::fmt;
use std::sync::Arc;

use crate::error::StateMismatch;
use crate::store::{keys, KeyValueStore};

/// An authorization code whose callback passed state validation.
///
/// Only [`CallbackValidator::validate`] creates values of this type, so a
/// [`TokenExchangeClient`](crate::auth::exchange::TokenExchangeClient) can
/// never be handed an unvalidated code.
#[derive(Clone, PartialEq, Eq)]
pub struct ValidatedCode {
    code: String,
    code_verifier: String,
}

impl ValidatedCode {
    pub(crate) fn new(code: impl Into<String>, code_verifier: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            code_verifier: code_verifier.into(),
        }
    }

    /// The authorization code received on the callback.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// The `code_verifier` persisted with the pending request.
    pub fn code_verifier(&self) -> &str {
        &self.code_verifier
    }
}

impl fmt::Debug for ValidatedCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatedCode")
            .field("code", &"<redacted>")
            .field("code_verifier", &"<redacted>")
            .finish()
    }
}

/// Checks callbacks against the persisted pending request.
#[derive(Debug, Clone)]
pub struct CallbackValidator {
    store: Arc<dyn KeyValueStore>,
}

impl CallbackValidator {
    /// Creates a validator reading the pending request from `store`.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Validates a callback's `state` and pairs its `code` with the stored
    /// verifier.
    ///
    /// `code` is passed through without inspection. The pending request is
    /// left in place.
    ///
    /// # Errors
    ///
    /// Returns [`StateMismatch`] when `state` differs from the persisted
    /// value, when no pending request exists, or when the pending request
    /// cannot be read.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    /// use authflow::auth::callback::CallbackValidator;
    /// use authflow::store::{KeyValueStore, MemoryStore};
    /// use serde_json::json;
    ///
    /// let store = Arc::new(MemoryStore::new());
    /// store.set("state", json!("S1")).unwrap();
    /// store.set("codeVerifier", json!("V1")).unwrap();
    ///
    /// let validator = CallbackValidator::new(store);
    /// let validated = validator.validate("abc", "S1").unwrap();
    /// assert_eq!(validated.code_verifier(), "V1");
    /// assert!(validator.validate("abc", "wrong").is_err());
    /// ```
    pub fn validate(&self, code: &str, state: &str) -> Result<ValidatedCode, StateMismatch> {
        let expected_state = self.read_pending(keys::STATE)?;

        if state != expected_state {
            tracing::warn!("Rejected OAuth callback: state does not match pending request");
            return Err(StateMismatch);
        }

        let code_verifier = self.read_pending(keys::CODE_VERIFIER)?;

        tracing::debug!("OAuth callback state validated");
        Ok(ValidatedCode::new(code, code_verifier))
    }

    fn read_pending(&self, key: &str) -> Result<String, StateMismatch> {
        match self.store.get_string(key) {
            Ok(Some(value)) if !value.is_empty() => Ok(value),
            Ok(_) => {
                tracing::warn!(key, "Rejected OAuth callback: no pending authorization request");
                Err(StateMismatch)
            }
            Err(e) => {
                tracing::warn!(key, error = %e, "Rejected OAuth callback: pending request unreadable");
                Err(StateMismatch)
            }
        }
    }
}
