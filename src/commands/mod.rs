/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint:

- `login`    -- Start a login and print the authorization URL
- `callback` -- Complete a login from the redirect
- `status`   -- Show the current session
- `logout`   -- Clear the session

Each handler opens the session store named by the configuration, builds an
[`AuthClient`] over it, and performs one step of the flow. State carries
between invocations through the store.
*/

use crate::client::{AuthClient, LoginOutcome};
use crate::config::Config;
use crate::session::Session;
use crate::error::{AuthflowError, Result};
use crate::store::SledStore;
use crate::transport::ReqwestTransport;
use colored::Colorize;
use std::sync::Arc;

/// Builds an [`AuthClient`] over the configured session store.
///
/// # Errors
///
/// Returns [`AuthflowError::Storage`] if the store cannot be opened, or
/// [`AuthflowError::Config`] if the HTTP client cannot be built.
pub fn build_client(config: &Config) -> Result<AuthClient> {
    let path = match &config.storage.path {
        Some(path) => path.clone(),
        None => SledStore::default_path()?,
    };
    tracing::debug!("Using session store at {}", path.display());

    let store = Arc::new(SledStore::open(&path)?);
    let transport = Arc::new(ReqwestTransport::new(&config.http.user_agent)?);
    AuthClient::new(config.oauth.clone(), store, transport)
}

// Login command handler
pub mod login {
    //! Starts a login.
    //!
    //! Prints the authorization URL and optionally opens it in the system
    //! browser. The pending request is persisted so that `callback` can
    //! validate the redirect in a later invocation.

    use super::*;

    /// Start a login
    ///
    /// # Arguments
    ///
    /// * `config` - Validated configuration
    /// * `open` - Try to open the URL in the system browser
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be opened or written.
    pub fn run_login(config: &Config, open: bool) -> Result<()> {
        let client = build_client(config)?;
        let url = client.login_url()?;

        println!("Open the following URL in your browser to log in:");
        println!("{}", url.cyan());
        println!();
        println!(
            "Then run {} with the URL you are redirected to.",
            "authflow callback --url <redirect-url>".bold()
        );

        if open {
            try_open_browser(&url);
        }

        Ok(())
    }

    /// Attempts to open the authorization URL in the user's default browser.
    ///
    /// Errors are ignored; the URL has already been printed.
    fn try_open_browser(url: &str) {
        #[cfg(target_os = "macos")]
        {
            let _ = std::process::Command::new("open").arg(url).spawn();
        }
        #[cfg(target_os = "linux")]
        {
            let _ = std::process::Command::new("xdg-open").arg(url).spawn();
        }
        #[cfg(target_os = "windows")]
        {
            let _ = std::process::Command::new("cmd")
                .args(["/C", "start", "", url])
                .spawn();
        }
        #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
        {
            let _ = url;
        }
    }
}

// Callback command handler
pub mod callback {
    //! Completes a login from the authorization server's redirect.

    use super::*;
    use std::time::Duration;
    use url::Url;

    /// Extracts `code` and `state` from a redirect URL.
    ///
    /// # Errors
    ///
    /// Returns [`AuthflowError::Authentication`] if the URL is invalid,
    /// carries an `error` parameter from the authorization server, or lacks
    /// `code` or `state`.
    ///
    /// # Examples
    ///
    /// ```
    /// use authflow::commands::callback::parse_redirect;
    ///
    /// let (code, state) =
    ///     parse_redirect("http://localhost:4200/callback?code=abc&state=S1").unwrap();
    /// assert_eq!(code, "abc");
    /// assert_eq!(state, "S1");
    /// ```
    pub fn parse_redirect(redirect: &str) -> Result<(String, String)> {
        let url = Url::parse(redirect).map_err(|e| {
            AuthflowError::Authentication(format!("invalid redirect URL: {e}"))
        })?;

        let mut code = None;
        let mut state = None;
        let mut error = None;
        let mut error_description = None;
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "code" => code = Some(value.into_owned()),
                "state" => state = Some(value.into_owned()),
                "error" => error = Some(value.into_owned()),
                "error_description" => error_description = Some(value.into_owned()),
                _ => {}
            }
        }

        if let Some(error) = error {
            let detail = error_description
                .map(|d| format!(": {d}"))
                .unwrap_or_default();
            return Err(AuthflowError::Authentication(format!(
                "authorization server returned {error}{detail}"
            ))
            .into());
        }

        match (code, state) {
            (Some(code), Some(state)) => Ok((code, state)),
            _ => Err(AuthflowError::Authentication(
                "redirect URL must carry both code and state".to_string(),
            )
            .into()),
        }
    }

    /// Runs [`AuthClient::complete_login`] bounded by `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthflowError::Transport`] with
    /// [`TransportError::Request`](crate::error::TransportError::Request) if
    /// the deadline passes first, otherwise whatever `complete_login` returns.
    pub async fn complete_within(
        client: &AuthClient,
        code: &str,
        state: &str,
        timeout: Duration,
    ) -> Result<LoginOutcome> {
        tokio::time::timeout(timeout, client.complete_login(code, state))
            .await
            .map_err(|_| {
                AuthflowError::Transport(crate::error::TransportError::Request(format!(
                    "token exchange timed out after {}s",
                    timeout.as_secs()
                )))
            })?
    }

    /// Complete a login
    ///
    /// The exchange is bounded by `http.exchange_timeout_seconds`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthflowError::StateMismatch`] if the callback is rejected,
    /// or the underlying error if the exchange fails or times out.
    pub async fn run_callback(config: &Config, code: &str, state: &str) -> Result<()> {
        let client = build_client(config)?;
        let timeout = Duration::from_secs(config.http.exchange_timeout_seconds);

        let outcome = complete_within(&client, code, state, timeout).await?;

        match outcome {
            LoginOutcome::LoggedIn(tokens) => {
                println!(
                    "{} ({} token, expires in {}s)",
                    "Logged in".green().bold(),
                    tokens.token_type,
                    tokens.expires_in
                );
                Ok(())
            }
            LoginOutcome::Rejected => {
                eprintln!(
                    "{}",
                    "Login rejected: callback state does not match the pending login."
                        .red()
                );
                Err(AuthflowError::StateMismatch(crate::error::StateMismatch).into())
            }
        }
    }

}

// Status command handler
pub mod status {
    //! Shows the current session without revealing tokens.

    use super::*;

    /// Show the current session
    ///
    /// # Arguments
    ///
    /// * `config` - Configuration naming the session store
    /// * `json` - Print JSON instead of text
    pub fn run_status(config: &Config, json: bool) -> Result<()> {
        let client = build_client(config)?;
        let session = client.session();

        if json {
            println!("{}", render_json(&session)?);
            return Ok(());
        }

        if session.is_authenticated {
            println!("{}", "Authenticated".green().bold());
            if let Some(token_type) = &session.token_type {
                println!("  Token type: {}", token_type);
            }
            if let Some(expires_in) = session.expires_in {
                println!("  Expires in: {}s (at issue time)", expires_in);
            }
        } else {
            println!("{}", "Not authenticated".yellow());
        }

        Ok(())
    }

    /// Renders a session as pretty JSON. Tokens are never included.
    pub fn render_json(session: &Session) -> Result<String> {
        Ok(serde_json::to_string_pretty(session).map_err(AuthflowError::from)?)
    }

}

// Logout command handler
pub mod logout {
    //! Clears the session and any pending login.

    use super::*;

    /// Log out
    pub fn run_logout(config: &Config) -> Result<()> {
        let client = build_client(config)?;
        client.logout()?;
        println!("{}", "Logged out".green());
        Ok(())
    }
}
