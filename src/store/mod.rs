//! Persistent key-value store abstraction
//!
//! The authorization flow keeps its pending request and session material in
//! an external store. This module defines the [`KeyValueStore`] trait that
//! all backends must satisfy, the well-known key names in [`keys`], and two
//! implementations:
//!
//! - [`memory::MemoryStore`] -- process-local map, useful for tests and for
//!   embedding in applications that manage persistence themselves.
//! - [`sled_store::SledStore`] -- durable on-disk store backed by `sled`.
//!
//! Values are [`serde_json::Value`]s so numeric fields (`expiresIn`) keep
//! their type across a round-trip.

use serde_json::Value;

use crate::error::Result;

pub mod memory;
pub mod sled_store;

pub use memory::MemoryStore;
pub use sled_store::SledStore;

/// Key names used in the persistent store.
pub mod keys {
    /// Anti-CSRF `state` of the pending authorization request
    pub const STATE: &str = "state";
    /// PKCE `code_verifier` of the pending authorization request
    pub const CODE_VERIFIER: &str = "codeVerifier";
    /// `token_type` from the last token response
    pub const TOKEN_TYPE: &str = "tokenType";
    /// `expires_in` from the last token response
    pub const EXPIRES_IN: &str = "expiresIn";
    /// `access_token` from the last token response
    pub const ACCESS_TOKEN: &str = "accessToken";
    /// `refresh_token` from the last token response
    pub const REFRESH_TOKEN: &str = "refreshToken";

    /// Every key written by the crate.
    pub const ALL: [&str; 6] = [
        STATE,
        CODE_VERIFIER,
        TOKEN_TYPE,
        EXPIRES_IN,
        ACCESS_TOKEN,
        REFRESH_TOKEN,
    ];
}

/// Abstraction over the persistent store holding session data.
///
/// Implementations must be safe to share across tasks; they are used
/// polymorphically through `Arc<dyn KeyValueStore>`.
pub trait KeyValueStore: Send + Sync + std::fmt::Debug {
    /// Returns the value stored under `key`, or `None` when absent.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::AuthflowError::Storage`] if the backend fails
    /// or the stored bytes cannot be decoded.
    fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: Value) -> Result<()>;

    /// Stores every entry in a single atomic write.
    ///
    /// Either all entries become visible or none do.
    fn set_all(&self, entries: &[(&str, Value)]) -> Result<()>;

    /// Removes every entry from the store.
    fn clear(&self) -> Result<()>;

    /// Convenience accessor for string-valued keys.
    ///
    /// Values that are present but not strings are treated as absent.
    fn get_string(&self, key: &str) -> Result<Option<String>> {
        Ok(self.get(key)?.and_then(|v| match v {
            Value::String(s) => Some(s),
            _ => None,
        }))
    }
}
