//! OAuth2 authorization code flow with PKCE
//!
//! # Module Layout
//!
//! - [`random`]   -- alphanumeric random tokens for `state` and
//!   `code_verifier`
//! - [`pkce`]     -- PKCE `S256` challenge derivation
//! - [`request`]  -- authorization URL construction and pending-request
//!   persistence
//! - [`callback`] -- `state` validation of the redirect callback
//! - [`exchange`] -- authorization code for token exchange
//!
//! # References
//!
//! - RFC 6749 OAuth 2.0 <https://www.rfc-editor.org/rfc/rfc6749>
//! - RFC 7636 PKCE <https://www.rfc-editor.org/rfc/rfc7636>

pub mod callback;
pub mod exchange;
pub mod pkce;
pub mod random;
pub mod request;
