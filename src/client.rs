//! High-level authorization client
//!
//! [`AuthClient`] wires the request builder, callback validator, token
//! exchange and session store into the complete login flow:
//!
//! 1. [`AuthClient::login_url`] -- start a login and get the URL to send the
//!    user to.
//! 2. [`AuthClient::complete_login`] -- handle the redirect: validate
//!    `state`, exchange the code, commit the session.
//! 3. [`AuthClient::logout`] -- forget everything.
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//! use authflow::client::{AuthClient, LoginOutcome};
//! use authflow::config::OAuthConfig;
//! use authflow::store::SledStore;
//! use authflow::transport::ReqwestTransport;
//!
//! # async fn example() -> authflow::error::Result<()> {
//! let config = OAuthConfig {
//!     client_id: "my-client".to_string(),
//!     authorization_endpoint: "https://auth.example.com/oauth/authorize".to_string(),
//!     token_endpoint: "https://auth.example.com/oauth/token".to_string(),
//!     redirect_uri: "http://localhost:4200/callback".to_string(),
//!     ..OAuthConfig::default()
//! };
//! let client = AuthClient::new(
//!     config,
//!     Arc::new(SledStore::open("/tmp/authflow/session.db")?),
//!     Arc::new(ReqwestTransport::new("authflow")?),
//! )?;
//!
//! println!("Open {}", client.login_url()?);
//!
//! // ...later, from the redirect:
//! match client.complete_login("code-from-redirect", "state-from-redirect").await? {
//!     LoginOutcome::LoggedIn(_) => println!("logged in"),
//!     LoginOutcome::Rejected => println!("callback rejected"),
//! }
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use crate::auth::callback::CallbackValidator;
use crate::auth::exchange::{TokenExchangeClient, TokenResponse};
use crate::auth::request::AuthorizationRequestBuilder;
use crate::config::OAuthConfig;
use crate::error::{AuthflowError, Result};
use crate::events::EventNotifier;
use crate::session::{Session, SessionStore};
use crate::store::KeyValueStore;
use crate::transport::HttpTransport;

/// Result of handling an authorization callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Tokens were obtained and committed to the session
    LoggedIn(TokenResponse),
    /// The callback's `state` did not match the pending request; nothing
    /// was sent to the token endpoint and the session is unchanged
    Rejected,
}

impl LoginOutcome {
    /// `true` for [`LoginOutcome::LoggedIn`].
    pub fn is_logged_in(&self) -> bool {
        matches!(self, LoginOutcome::LoggedIn(_))
    }
}

/// Facade over the complete authorization code flow.
#[derive(Debug)]
pub struct AuthClient {
    request_builder: AuthorizationRequestBuilder,
    validator: CallbackValidator,
    exchange: TokenExchangeClient,
    session: SessionStore,
    events: Arc<EventNotifier>,
}

impl AuthClient {
    /// Creates a client and loads the persisted session.
    ///
    /// # Errors
    ///
    /// Returns [`AuthflowError::Storage`] if the session cannot be read.
    pub fn new(
        config: OAuthConfig,
        store: Arc<dyn KeyValueStore>,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Self> {
        let events = Arc::new(EventNotifier::new());
        let session = SessionStore::load(Arc::clone(&store), Arc::clone(&events))?;

        Ok(Self {
            request_builder: AuthorizationRequestBuilder::new(config.clone(), Arc::clone(&store)),
            validator: CallbackValidator::new(store),
            exchange: TokenExchangeClient::new(config, transport),
            session,
            events,
        })
    }

    /// Starts a login and returns the authorization URL.
    ///
    /// Any login started earlier is invalidated.
    pub fn login_url(&self) -> Result<String> {
        self.request_builder.build_login_url()
    }

    /// Completes a login from the redirect's `code` and `state`.
    ///
    /// # Returns
    ///
    /// [`LoginOutcome::Rejected`] when `state` does not match the pending
    /// request, otherwise [`LoginOutcome::LoggedIn`] with the committed
    /// tokens.
    ///
    /// # Errors
    ///
    /// Returns [`AuthflowError::Transport`] if the token exchange fails, or
    /// [`AuthflowError::Storage`] if the tokens cannot be committed. In both
    /// cases the session is left as it was.
    pub async fn complete_login(&self, code: &str, state: &str) -> Result<LoginOutcome> {
        let validated = match self.validator.validate(code, state) {
            Ok(validated) => validated,
            Err(_) => return Ok(LoginOutcome::Rejected),
        };

        let tokens = self
            .exchange
            .exchange(&validated)
            .await
            .map_err(AuthflowError::from)?;

        self.session.commit(&tokens)?;
        Ok(LoginOutcome::LoggedIn(tokens))
    }

    /// Clears the session and any pending login.
    pub fn logout(&self) -> Result<()> {
        self.session.clear()
    }

    /// Whether a session is currently authenticated.
    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// Snapshot of the current session.
    pub fn session(&self) -> Session {
        self.session.session()
    }

    /// Login/logout notifications.
    pub fn events(&self) -> &EventNotifier {
        &self.events
    }
}
