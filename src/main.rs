//! Authflow - OAuth2 authorization code flow CLI
//!
#![doc = "Authflow - OAuth2 authorization code flow CLI"]
#![doc = "Main entry point for the authflow binary."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use authflow::cli::{Cli, Commands};
use authflow::commands;
use authflow::config::Config;
use authflow::error::AuthflowError;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose, cli.json_logs);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Login { open } => {
            tracing::info!("Starting login");
            commands::login::run_login(&config, open)?;
            Ok(())
        }
        Commands::Callback { url, code, state } => {
            tracing::info!("Completing login from callback");
            let (code, state) = match (url, code, state) {
                (Some(url), _, _) => commands::callback::parse_redirect(&url)?,
                (None, Some(code), Some(state)) => (code, state),
                _ => {
                    return Err(AuthflowError::Config(
                        "callback requires --url, or --code with --state".to_string(),
                    )
                    .into())
                }
            };
            commands::callback::run_callback(&config, &code, &state).await?;
            Ok(())
        }
        Commands::Status { json } => {
            commands::status::run_status(&config, json)?;
            Ok(())
        }
        Commands::Logout => {
            tracing::info!("Logging out");
            commands::logout::run_logout(&config)?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
fn init_tracing(verbose: bool, json: bool) {
    let default_directive = if verbose {
        "authflow=debug"
    } else {
        "authflow=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let registry = tracing_subscriber::registry().with(env_filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
