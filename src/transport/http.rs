//! `reqwest`-backed transport for the token endpoint

use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE};

use crate::error::{AuthflowError, Result, TransportError};
use crate::transport::{HttpResponse, HttpTransport};

/// Production [`HttpTransport`] using a shared `reqwest::Client`.
///
/// # Examples
///
/// ```no_run
/// use authflow::transport::ReqwestTransport;
///
/// let transport = ReqwestTransport::new("authflow/0.1.0").unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Builds a transport sending the given `User-Agent`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthflowError::Config`] if the TLS backend cannot be
    /// initialized.
    pub fn new(user_agent: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| AuthflowError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Wraps an existing client, sharing its connection pool.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl HttpTransport for ReqwestTransport {
    async fn post_form(
        &self,
        url: &str,
        form: &[(&str, &str)],
    ) -> std::result::Result<HttpResponse, TransportError> {
        let resp = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header(ACCEPT, "application/json")
            .form(form)
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let status = resp.status().as_u16();
        let body = resp
            .text()
            .await
            .map_err(|e| TransportError::Request(format!("failed to read response body: {e}")))?;

        tracing::debug!(status, body_len = body.len(), "Token endpoint responded");
        Ok(HttpResponse { status, body })
    }
}
