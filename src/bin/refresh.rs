//! Script mode binary for one-shot session refresh
//!
//! Runs a single refresh against the configured portal and prints the
//! resulting session token to stdout as JSON.
//!
//! # Usage
//!
//! ```bash
//! sso-session --storage-file ~/.cache/sso-session-provider/session.json
//! ```
//!
//! # Output
//!
//! ```json
//! {"token": "session_cookie_value"}
//! ```
//!
//! On failure an empty JSON object is printed and the process exits with a
//! non-zero status; diagnostics go to stderr.

use std::path::PathBuf;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sso_session_provider::{AuthProvider, Settings, config::ConfigLoader, utils::get_version};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "sso-session")]
struct Cli {
    /// Path of the persisted session record
    #[arg(short, long, value_name = "FILE")]
    storage_file: Option<PathBuf>,

    /// Configuration file (TOML)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Disable the interactive auth window; refresh fails when the identity
    /// provider demands a human challenge
    #[arg(long)]
    no_auth_window: bool,

    /// Bound the wait for the interactive redirect, in seconds (unbounded by
    /// default)
    #[arg(long, value_name = "SECS")]
    redirect_timeout_secs: Option<u64>,

    /// Enable verbose logging
    #[arg(long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Diagnostics stay on stderr so stdout carries only the JSON result.
    let default_filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let loader = ConfigLoader::new(default_storage_path()?);
    let settings = apply_cli_overrides(loader.load(cli.config.as_deref())?, &cli);

    debug!(
        "{} refreshing against {} (auth window enabled: {})",
        get_version(),
        settings.portal.home_url,
        settings.auth_window.enabled
    );

    let mut provider = AuthProvider::new(settings);
    match provider.refresh().await {
        Ok(token) => {
            println!("{}", serde_json::json!({ "token": token }));
        }
        Err(e) => {
            eprintln!("Failed to refresh session. Error: {e}");
            println!("{{}}");
            std::process::exit(1);
        }
    }

    Ok(())
}

/// CLI arguments take precedence over file and environment configuration
fn apply_cli_overrides(mut settings: Settings, cli: &Cli) -> Settings {
    if let Some(ref path) = cli.storage_file {
        settings.storage.file_path = path.clone();
    }

    if cli.no_auth_window {
        settings.auth_window.enabled = false;
    }

    if let Some(secs) = cli.redirect_timeout_secs {
        settings.auth_window.redirect_timeout_secs = Some(secs);
    }

    if cli.verbose {
        settings.logging.verbose = true;
    }

    settings
}

/// Default record location under the user cache directory
fn default_storage_path() -> anyhow::Result<PathBuf> {
    let base = dirs::cache_dir()
        .ok_or_else(|| anyhow::anyhow!("could not determine the user cache directory"))?;
    Ok(base.join("sso-session-provider").join("session.json"))
}
