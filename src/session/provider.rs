//! Session refresh orchestration
//!
//! The provider owns the refresh state machine. A refresh first tries the
//! browser-free fast path (once per process), then drives a headless context
//! through silent login, hands off to the interactive auth window when the
//! identity provider demands it, and finally extracts and persists the
//! session token. Every fatal exit releases the browser first.
//!
//! A provider instance is single-caller: `refresh` takes `&mut self` and
//! concurrent calls on one instance are not supported. Callers wanting
//! parallelism create separate instances over separate stores.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::{
    Error, Result,
    browser::{BrowserEngine, BrowserSession, ChromiumEngine, LaunchMode},
    config::Settings,
    session::{auth_window::AuthWindowController, bridge::SessionBridge},
    store::CookieStore,
};

/// Pause after clicking the login button so the resulting navigation begins
/// before the network-idle wait starts
const CLICK_SETTLE: Duration = Duration::from_millis(200);

/// Outcome of the silent login probe
enum SilentLogin {
    /// The portal is authenticated, either from restored cookies or because
    /// the identity provider auto-approved the click-through
    Authenticated,
    /// The click-through landed inside the identity provider; a human has to
    /// finish the challenge at the carried URL
    NeedsInteractive(String),
}

/// Convenience type alias for the provider with the production engine
pub type AuthProvider = AuthProviderGeneric<ChromiumEngine>;

/// Session provider driving silent and interactive refresh
pub struct AuthProviderGeneric<E: BrowserEngine> {
    /// Configuration
    settings: Settings,
    /// Browser engine launching the headless and window contexts
    engine: E,
    /// Cookie bridge over the persisted record
    bridge: SessionBridge,
    /// Currently driven browser session, if a refresh is in flight
    active: Option<E::Session>,
    /// Last observed value of the portal session cookie
    last_auth_cookie: Option<String>,
    /// Whether the one-time fast path is still available
    first_refresh: bool,
}

impl AuthProviderGeneric<ChromiumEngine> {
    /// Create a provider with the production Chromium engine.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use sso_session_provider::{AuthProvider, Settings};
    ///
    /// # tokio_test::block_on(async {
    /// let mut provider = AuthProvider::new(Settings::new("session.json"));
    /// let token = provider.refresh().await?;
    /// println!("session token: {token}");
    /// # Ok::<(), sso_session_provider::Error>(())
    /// # });
    /// ```
    pub fn new(settings: Settings) -> Self {
        Self::with_engine(settings, ChromiumEngine::new())
    }
}

impl<E: BrowserEngine> AuthProviderGeneric<E> {
    /// Create a provider over a custom browser engine
    pub fn with_engine(settings: Settings, engine: E) -> Self {
        let bridge = SessionBridge::new(CookieStore::new(settings.storage.file_path.clone()));
        Self {
            settings,
            engine,
            bridge,
            active: None,
            last_auth_cookie: None,
            first_refresh: true,
        }
    }

    /// The provider's configuration
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Last session token this instance observed, if any
    pub fn last_auth_cookie(&self) -> Option<&str> {
        self.last_auth_cookie.as_deref()
    }

    /// Obtain a valid session token.
    ///
    /// The very first call after construction returns the persisted token
    /// directly when one exists, without launching a browser; a stale token
    /// surfaces as a failed portal call on the caller's side, and the next
    /// `refresh` then drives the full flow. Every later call launches a
    /// headless context, restores stored cookies, probes the portal's login
    /// button, completes silently or through the interactive window, and
    /// returns the freshly extracted token.
    ///
    /// # Errors
    ///
    /// - [`Error::WindowDisabled`] when the flow needs the interactive window
    ///   but it is disabled
    /// - [`Error::WindowLaunch`] when the visible window cannot be created
    /// - [`Error::AuthenticationFailed`] when the portal still demands login
    ///   after the recovery re-probe
    /// - [`Error::TokenNotFound`] when the authenticated page lacks the
    ///   session cookie
    ///
    /// The browser context is closed before any of these reach the caller.
    pub async fn refresh(&mut self) -> Result<String> {
        if self.first_refresh {
            self.first_refresh = false;
            if let Some(token) = self.cached_token().await {
                info!("Reusing persisted session token");
                return Ok(token);
            }
        }

        let session = self
            .engine
            .launch(LaunchMode::Headless, &self.settings)
            .await?;
        self.active = Some(session);

        let failure = match self.silent_login().await {
            Ok(SilentLogin::Authenticated) => None,
            Ok(SilentLogin::NeedsInteractive(challenge_url)) => {
                match self.interactive_login(&challenge_url).await {
                    Ok(()) => None,
                    // Neither kind can be cured by re-probing the portal.
                    Err(err @ (Error::WindowDisabled | Error::WindowLaunch(_))) => {
                        self.close_active().await;
                        return Err(err);
                    }
                    Err(err) => Some(err),
                }
            }
            Err(err) => Some(err),
        };

        if let Some(original) = failure {
            match self.recover_after_failure().await {
                Ok(true) => {
                    info!("Login button gone after recovery, treating failure as transient");
                }
                Ok(false) | Err(_) => {
                    self.close_active().await;
                    return Err(Error::authentication_failed(original));
                }
            }
        }

        let token = match self.extract_session_token().await {
            Ok(token) => token,
            Err(err) => {
                self.close_active().await;
                return Err(err);
            }
        };

        self.last_auth_cookie = Some(token.clone());
        if let Err(err) = self.persist_active_session().await {
            self.close_active().await;
            return Err(err);
        }

        self.close_active().await;
        Ok(token)
    }

    /// Browser-free fast path: the persisted token, if one is cached
    async fn cached_token(&self) -> Option<String> {
        self.bridge
            .store()
            .load()
            .await
            .and_then(|record| record.last_auth_cookie)
            .filter(|token| !token.is_empty())
    }

    /// Restore cookies, reach the portal, and probe the login button
    async fn silent_login(&mut self) -> Result<SilentLogin> {
        let Some(session) = self.active.as_ref() else {
            return Err(Error::internal("no active browser session"));
        };

        self.bridge
            .apply_to(session, &mut self.last_auth_cookie)
            .await;
        session.goto(&self.settings.portal.home_url).await?;

        let selector = &self.settings.portal.login_button_selector;
        if !session.has_selector(selector).await? {
            debug!("Already logged in");
            return Ok(SilentLogin::Authenticated);
        }

        session.click(selector).await?;
        tokio::time::sleep(CLICK_SETTLE).await;
        session.wait_for_network_idle().await?;

        let url = session.current_url().await?;
        if url.starts_with(&self.settings.portal.idp_origin) {
            info!("Asking for interactive authentication");
            Ok(SilentLogin::NeedsInteractive(url))
        } else {
            debug!("Auto-auth was successful");
            Ok(SilentLogin::Authenticated)
        }
    }

    /// Run the interactive challenge and bring its result back into the
    /// headless context
    async fn interactive_login(&mut self, challenge_url: &str) -> Result<()> {
        let Some(session) = self.active.as_ref() else {
            return Err(Error::internal("no active browser session"));
        };

        // Seed the store so the window starts from the headless context's jar.
        self.bridge
            .capture_from(session, self.last_auth_cookie.as_deref())
            .await?;

        let controller = AuthWindowController::new(&self.engine, &self.bridge, &self.settings);
        controller
            .run(challenge_url, &mut self.last_auth_cookie)
            .await?;

        let Some(session) = self.active.as_ref() else {
            return Err(Error::internal("no active browser session"));
        };
        self.bridge
            .apply_to(session, &mut self.last_auth_cookie)
            .await;
        session.reload().await?;
        session.wait_for_network_idle().await?;
        self.bridge
            .capture_from(session, self.last_auth_cookie.as_deref())
            .await
    }

    /// One recovery transition: re-navigate to the portal and re-probe.
    ///
    /// Returns true when the login button is gone, meaning the earlier
    /// failure was a transient navigation race. This heuristic can in
    /// principle mistake an unrelated render change for recovery; token
    /// extraction still fails closed in that case.
    async fn recover_after_failure(&mut self) -> Result<bool> {
        warn!("Silent login failed, re-probing the portal");
        let Some(session) = self.active.as_ref() else {
            return Err(Error::internal("no active browser session"));
        };

        session.goto(&self.settings.portal.home_url).await?;
        let login_present = session
            .has_selector(&self.settings.portal.login_button_selector)
            .await?;
        Ok(!login_present)
    }

    /// Read the session token from the active page's cookie jar
    async fn extract_session_token(&self) -> Result<String> {
        let Some(session) = self.active.as_ref() else {
            return Err(Error::internal("no active browser session"));
        };

        let cookie_name = &self.settings.portal.session_cookie;
        let cookies = session.page_cookies().await?;
        cookies
            .into_iter()
            .find(|cookie| cookie.name == *cookie_name)
            .map(|cookie| cookie.value)
            .ok_or_else(|| Error::token_not_found(cookie_name.clone()))
    }

    /// Persist the active session's jar together with the fresh token
    async fn persist_active_session(&mut self) -> Result<()> {
        let Some(session) = self.active.as_ref() else {
            return Err(Error::internal("no active browser session"));
        };
        self.bridge
            .capture_from(session, self.last_auth_cookie.as_deref())
            .await
    }

    /// Release the active browser session, if any. Close failures are logged
    /// rather than raised so they never mask the error being propagated.
    async fn close_active(&mut self) {
        if let Some(mut session) = self.active.take() {
            if let Err(err) = session.close().await {
                warn!("Failed to close browser session: {err}");
            }
        }
    }
}
