//! Error type definitions
//!
//! Defines the main error types used throughout the session provider. Every
//! fatal kind is raised only after the owning browser session has been
//! released, so callers never inherit a leaked browser process.

use thiserror::Error;

/// Main error type for the session provider
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration-related errors (invalid settings, unparseable URLs)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Interactive hand-off was required but the auth window is disabled
    #[error("Interactive auth window is disabled")]
    WindowDisabled,

    /// The visible auth window could not be created. Distinct from silent
    /// login failures so operators can diagnose display-less deployments.
    #[error("Auth window launch failed: {0}")]
    WindowLaunch(String),

    /// Browser driver errors (launch, navigation, evaluation, CDP transport)
    #[error("Browser error: {0}")]
    Browser(String),

    /// The portal still shows the login button after the recovery re-probe
    #[error("Portal authentication failed: login still required after recovery")]
    AuthenticationFailed {
        /// The failure that triggered the recovery attempt
        #[source]
        source: Box<Error>,
    },

    /// The authenticated page does not carry the expected session cookie
    #[error("Session token cookie `{cookie}` not found")]
    TokenNotFound { cookie: String },

    /// Internal invariant violations
    #[error("Internal error: {0}")]
    Internal(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new browser driver error
    pub fn browser(msg: impl Into<String>) -> Self {
        Self::Browser(msg.into())
    }

    /// Create an auth window launch error
    pub fn window_launch(msg: impl Into<String>) -> Self {
        Self::WindowLaunch(msg.into())
    }

    /// Wrap a probe failure that survived the recovery re-probe
    pub fn authentication_failed(source: Error) -> Self {
        Self::AuthenticationFailed {
            source: Box::new(source),
        }
    }

    /// Create a token-not-found error for the named session cookie
    pub fn token_not_found(cookie: impl Into<String>) -> Self {
        Self::TokenNotFound {
            cookie: cookie.into(),
        }
    }

    /// Create a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
