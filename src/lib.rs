//! Authflow - OAuth2 authorization code flow client with PKCE
//!
//! This library lets a public client authenticate a user against a remote
//! authorization server without holding a client secret. It builds the
//! authorization request, validates the redirect callback, exchanges the
//! code for tokens, and tracks the resulting session.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `auth`: Protocol logic (random tokens, PKCE, request, callback, exchange)
//! - `session`: Authenticated state backed by the persistent store
//! - `events`: Login/logout notifications
//! - `client`: Facade running the complete flow
//! - `store`: Key-value store trait with in-memory and `sled` backends
//! - `transport`: HTTP transport trait with a `reqwest` implementation
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//! - `commands`: Handlers behind the `authflow` binary
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use authflow::{AuthClient, Config};
//! use authflow::store::MemoryStore;
//! use authflow::transport::ReqwestTransport;
//!
//! fn main() -> anyhow::Result<()> {
//!     let cli = authflow::cli::Cli::parse_args();
//!     let config = Config::load("config.yaml", &cli)?;
//!     config.validate()?;
//!
//!     let client = AuthClient::new(
//!         config.oauth.clone(),
//!         Arc::new(MemoryStore::new()),
//!         Arc::new(ReqwestTransport::new(&config.http.user_agent)?),
//!     )?;
//!     println!("{}", client.login_url()?);
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod cli;
pub mod client;
pub mod commands;
pub mod config;
pub mod error;
pub mod events;
pub mod session;
pub mod store;
pub mod transport;

// Re-export commonly used types
pub use client::{AuthClient, LoginOutcome};
pub use config::Config;
pub use error::{AuthflowError, Result, StateMismatch, TransportError};
pub use events::EventNotifier;
pub use session::{Session, SessionStore};
