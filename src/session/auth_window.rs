//! Interactive auth window
//!
//! When silent login lands inside the identity provider, a human has to
//! finish the challenge. This controller opens a visible app-mode window at
//! the challenge URL, seeds it with the stored cookies, and suspends until
//! the window issues a request back to the portal origin. By default the wait
//! is unbounded: interactive challenges have unbounded human-response time.
//! The window's effect is entirely through the persisted session record.

use tracing::{info, warn};

use crate::{
    Error, Result,
    browser::{BrowserEngine, BrowserSession, LaunchMode},
    config::Settings,
    session::bridge::SessionBridge,
};

/// Runs the interactive identity-provider challenge in a visible window
pub struct AuthWindowController<'a, E: BrowserEngine> {
    engine: &'a E,
    bridge: &'a SessionBridge,
    settings: &'a Settings,
}

impl<'a, E: BrowserEngine> AuthWindowController<'a, E> {
    /// Create a controller over the given engine and bridge
    pub fn new(engine: &'a E, bridge: &'a SessionBridge, settings: &'a Settings) -> Self {
        Self {
            engine,
            bridge,
            settings,
        }
    }

    /// Open the window at the challenge URL and block until the identity
    /// provider redirects back to the portal, then capture the window's
    /// cookies and close it.
    ///
    /// Fails with [`Error::WindowDisabled`] when interactive hand-off is
    /// turned off, and with [`Error::WindowLaunch`] when the visible instance
    /// cannot be created. The window is closed on every other exit path.
    pub async fn run(&self, challenge_url: &str, cached_token: &mut Option<String>) -> Result<()> {
        if !self.settings.auth_window.enabled {
            return Err(Error::WindowDisabled);
        }

        info!("Opening auth window for the identity provider challenge");
        let mut window = self.engine.launch(LaunchMode::Window, self.settings).await?;

        let outcome = self.drive(&window, challenge_url, cached_token).await;
        if let Err(err) = window.close().await {
            warn!("Failed to close auth window: {err}");
        }
        outcome
    }

    async fn drive(
        &self,
        window: &E::Session,
        challenge_url: &str,
        cached_token: &mut Option<String>,
    ) -> Result<()> {
        self.bridge.apply_to(window, cached_token).await;
        window.goto(challenge_url).await?;

        info!("Waiting for the identity provider to redirect back to the portal");
        window
            .wait_for_request_to(&self.settings.portal.home_url, self.settings.redirect_timeout())
            .await?;

        self.bridge.capture_from(window, cached_token.as_deref()).await
    }
}
