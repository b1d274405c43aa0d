//! PKCE S256 code challenge derivation
//!
//! This module implements the `S256` transform of the Proof Key for Code
//! Exchange (PKCE) extension to OAuth 2.0 as defined in RFC 7636.
//!
//! # How PKCE works
//!
//! 1. The client generates a high-entropy random string called the `code_verifier`.
//! 2. The client computes a SHA-256 hash of the verifier and base64url-encodes
//!    it to produce the `code_challenge`.
//! 3. The authorization request includes `code_challenge` and
//!    `code_challenge_method=S256`.
//! 4. The token exchange request includes the original `code_verifier`.
//! 5. The authorization server recomputes the challenge and compares it to
//!    the value sent in step 3, proving possession of the verifier.
//!
//! # References
//!
//! - RFC 7636 <https://www.rfc-editor.org/rfc/rfc7636>

use base64::Engine as _;
use sha2::{Digest, Sha256};

/// The challenge method produced by [`challenge`].
pub const CHALLENGE_METHOD: &str = "S256";

/// Derives the `code_challenge` for a `code_verifier`.
///
/// The result is `BASE64URL(SHA256(ASCII(code_verifier)))` without padding
/// (RFC 7636 section 4.2), so it never contains `=`, `+` or `/`.
///
/// # Examples
///
/// ```
/// use authflow::auth::pkce::challenge;
///
/// // RFC 7636 Appendix B
/// let c = challenge("dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk");
/// assert_eq!(c, "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM");
/// ```
pub fn challenge(verifier: &str) -> String {
    let digest = Sha256::digest(verifier.as_bytes());
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(digest.as_slice())
}
