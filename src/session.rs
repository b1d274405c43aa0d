//! Session state
//!
//! [`SessionStore`] is the single in-process authority on whether the
//! application is authenticated. It reads the persisted session once at
//! construction, and afterwards changes only through [`SessionStore::commit`]
//! (after a successful token exchange) and [`SessionStore::clear`] (logout).
//!
//! The authenticated flag lives in an atomic so [`SessionStore::is_authenticated`]
//! never blocks or touches the store. `commit` and `clear` serialize on one
//! mutex so the four token fields are never written interleaved; events are
//! emitted after the mutex is released.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use serde_json::Value;

use crate::auth::exchange::TokenResponse;
use crate::error::{AuthflowError, Result};
use crate::events::EventNotifier;
use crate::store::{keys, KeyValueStore};

/// Snapshot of the application's authentication state.
#[derive(Clone, Default, PartialEq, Eq, Serialize)]
pub struct Session {
    /// `true` iff `access_token` is a non-empty string
    pub is_authenticated: bool,
    /// Token type from the last exchange
    pub token_type: Option<String>,
    /// Token lifetime in seconds from the last exchange
    pub expires_in: Option<u64>,
    /// Access token
    #[serde(skip_serializing)]
    pub access_token: Option<String>,
    /// Refresh token
    #[serde(skip_serializing)]
    pub refresh_token: Option<String>,
}

impl Session {
    fn from_tokens(tokens: &TokenResponse) -> Self {
        Self {
            is_authenticated: true,
            token_type: Some(tokens.token_type.clone()),
            expires_in: Some(tokens.expires_in),
            access_token: Some(tokens.access_token.clone()),
            refresh_token: Some(tokens.refresh_token.clone()),
        }
    }

    /// Value for an `Authorization` header, when authenticated.
    ///
    /// # Examples
    ///
    /// ```
    /// use authflow::session::Session;
    ///
    /// let session = Session {
    ///     is_authenticated: true,
    ///     token_type: Some("bearer".to_string()),
    ///     access_token: Some("tok1".to_string()),
    ///     ..Session::default()
    /// };
    /// assert_eq!(session.authorization_header().as_deref(), Some("Bearer tok1"));
    /// assert!(Session::default().authorization_header().is_none());
    /// ```
    pub fn authorization_header(&self) -> Option<String> {
        match (&self.access_token, self.is_authenticated) {
            (Some(token), true) => Some(format!("Bearer {token}")),
            _ => None,
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("is_authenticated", &self.is_authenticated)
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Owner of the [`Session`], backed by the persistent store.
///
/// Notifications are delivered after the state change is visible and
/// outside the internal lock, so listeners may query the store. When
/// `commit` and `clear` race on different threads, their notifications may
/// arrive in a different order than the state changes; listeners that need
/// the final state should read [`SessionStore::is_authenticated`] rather than
/// rely on the last payload received.
#[derive(Debug)]
pub struct SessionStore {
    store: Arc<dyn KeyValueStore>,
    events: Arc<EventNotifier>,
    session: Mutex<Session>,
    authenticated: AtomicBool,
}

impl SessionStore {
    /// Loads the persisted session.
    ///
    /// The session is authenticated iff a non-empty access token is stored.
    /// The other token fields are read leniently: missing or mistyped
    /// values become `None`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::AuthflowError::Storage`] if the store cannot be
    /// read.
    pub fn load(store: Arc<dyn KeyValueStore>, events: Arc<EventNotifier>) -> Result<Self> {
        let access_token = store
            .get_string(keys::ACCESS_TOKEN)?
            .filter(|token| !token.is_empty());

        let session = Session {
            is_authenticated: access_token.is_some(),
            token_type: store.get_string(keys::TOKEN_TYPE)?,
            expires_in: store.get(keys::EXPIRES_IN)?.and_then(|v| v.as_u64()),
            access_token,
            refresh_token: store.get_string(keys::REFRESH_TOKEN)?,
        };

        tracing::debug!(
            authenticated = session.is_authenticated,
            "Loaded persisted session"
        );

        Ok(Self {
            store,
            events,
            authenticated: AtomicBool::new(session.is_authenticated),
            session: Mutex::new(session),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Persists a token response and marks the session authenticated.
    ///
    /// All four fields are written in one atomic batch. Login subscribers
    /// are notified with `true` once the write has succeeded.
    ///
    /// # Errors
    ///
    /// Returns [`AuthflowError::Authentication`] if `tokens` carries an empty
    /// access token, or [`AuthflowError::Storage`] if the write fails. In
    /// both cases nothing is written, the in-memory session is unchanged and
    /// no event fires.
    pub fn commit(&self, tokens: &TokenResponse) -> Result<()> {
        if tokens.access_token.is_empty() {
            return Err(AuthflowError::Authentication(
                "refusing to commit a token response without an access token".to_string(),
            )
            .into());
        }

        {
            let mut session = self.lock();

            self.store.set_all(&[
                (keys::TOKEN_TYPE, Value::String(tokens.token_type.clone())),
                (keys::EXPIRES_IN, Value::from(tokens.expires_in)),
                (keys::ACCESS_TOKEN, Value::String(tokens.access_token.clone())),
                (keys::REFRESH_TOKEN, Value::String(tokens.refresh_token.clone())),
            ])?;

            *session = Session::from_tokens(tokens);
            self.authenticated.store(true, Ordering::SeqCst);
        }

        tracing::info!("Session committed");
        self.events.emit_login(true);
        Ok(())
    }

    /// Erases all persisted data and marks the session unauthenticated.
    ///
    /// This includes any pending authorization request. Logout subscribers
    /// are notified with `false`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::AuthflowError::Storage`] if the store cannot be
    /// cleared. The in-memory session is then unchanged and no event fires.
    pub fn clear(&self) -> Result<()> {
        {
            let mut session = self.lock();
            self.store.clear()?;
            *session = Session::default();
            self.authenticated.store(false, Ordering::SeqCst);
        }

        tracing::info!("Session cleared");
        self.events.emit_logout(false);
        Ok(())
    }

    /// Current authentication flag.
    pub fn is_authenticated(&self) -> bool {
        self.authenticated.load(Ordering::SeqCst)
    }

    /// Snapshot of the current session.
    pub fn session(&self) -> Session {
        self.lock().clone()
    }
}
