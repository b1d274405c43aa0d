//! Command-line interface definition for Authflow
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands to start a login, complete it from the redirect
//! callback, inspect the session, and log out.

use clap::{Parser, Subcommand};

/// Authflow - OAuth2 authorization code flow with PKCE
///
/// Runs the browser-based login flow against an authorization server and
/// keeps the resulting session in a local store.
#[derive(Parser, Debug, Clone)]
#[command(name = "authflow")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, env = "AUTHFLOW_CONFIG", default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,

    /// Override the session store location
    #[arg(long)]
    pub store_path: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Authflow
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start a login: print the authorization URL and remember the pending
    /// request
    Login {
        /// Also try to open the URL in the system browser
        #[arg(long)]
        open: bool,
    },

    /// Complete a login from the authorization server's redirect
    Callback {
        /// Full redirect URL, as seen in the browser address bar
        #[arg(long, conflicts_with_all = ["code", "state"], required_unless_present_all = ["code", "state"])]
        url: Option<String>,

        /// Authorization code from the redirect
        #[arg(long, requires = "state")]
        code: Option<String>,

        /// State value from the redirect
        #[arg(long, requires = "code")]
        state: Option<String>,
    },

    /// Show the current session
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Forget the session and any pending login
    Logout,
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
