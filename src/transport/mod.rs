//! HTTP transport abstraction for the token endpoint
//!
//! The token exchange needs exactly one kind of request: a form-encoded
//! POST whose response body is read as text. The [`HttpTransport`] trait
//! captures that, keeping status handling and JSON decoding in the
//! exchange logic where they can be tested without a network.
//!
//! - [`http::ReqwestTransport`] -- production implementation over
//!   `reqwest` with rustls.
//!
//! Retries, proxies and timeouts are the transport's business; the
//! exchange never retries.

pub mod http;

pub use http::ReqwestTransport;

use crate::error::TransportError;

/// Raw response returned by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body as text
    pub body: String,
}

impl HttpResponse {
    /// Returns `true` for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Abstraction over the HTTP client used to reach the token endpoint.
///
/// Used polymorphically through `Arc<dyn HttpTransport>`.
#[async_trait::async_trait]
pub trait HttpTransport: Send + Sync + std::fmt::Debug {
    /// POSTs `form` to `url` as `application/x-www-form-urlencoded`.
    ///
    /// Fields are encoded in the given order.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Request`] when no response could be
    /// obtained. Non-success statuses are *not* errors at this level.
    async fn post_form(
        &self,
        url: &str,
        form: &[(&str, &str)],
    ) -> Result<HttpResponse, TransportError>;
}
