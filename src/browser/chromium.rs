//! Chromium-backed browser engine
//!
//! Implements the browser capability on top of chromiumoxide. Each launched
//! session owns the browser process, the page it drives, and a background
//! task pumping the CDP WebSocket handler.

use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::{
    Cookie, CookieParam, CookieSameSite, EventRequestWillBeSent,
};
use chromiumoxide::cdp::browser_protocol::storage::GetCookiesParams;
use chromiumoxide::page::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::{
    Error, Result,
    browser::{BrowserEngine, BrowserSession, LaunchMode},
    config::Settings,
    types::StoredCookie,
};

/// Fixed dimensions of the interactive auth window
const AUTH_WINDOW_WIDTH: u32 = 1280;
const AUTH_WINDOW_HEIGHT: u32 = 720;

/// Pause after a navigation's load event before declaring the network settled
const NETWORK_SETTLE: Duration = Duration::from_millis(500);

/// Upper bound on waiting for a navigation's load event
const NAVIGATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Browser engine backed by a local Chromium/Chrome binary
#[derive(Debug, Clone, Copy, Default)]
pub struct ChromiumEngine;

impl ChromiumEngine {
    /// Create a new engine
    pub fn new() -> Self {
        Self
    }

    async fn launch_session(mode: LaunchMode, settings: &Settings) -> Result<ChromiumSession> {
        let config = browser_config(mode, settings)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| Error::browser(format!("failed to launch browser: {e}")))?;
        let handler_task = tokio::spawn(async move { while handler.next().await.is_some() {} });

        let page = match mode {
            LaunchMode::Headless => browser
                .new_page("about:blank")
                .await
                .map_err(|e| Error::browser(format!("failed to open page: {e}")))?,
            LaunchMode::Window => {
                // The app window comes up with its first page already open.
                let pages = browser
                    .pages()
                    .await
                    .map_err(|e| Error::browser(format!("failed to list pages: {e}")))?;
                match pages.into_iter().next() {
                    Some(page) => page,
                    None => browser
                        .new_page("about:blank")
                        .await
                        .map_err(|e| Error::browser(format!("failed to open page: {e}")))?,
                }
            }
        };

        debug!("Launched {mode:?} browser session");
        Ok(ChromiumSession {
            browser,
            handler_task,
            page,
        })
    }
}

#[async_trait]
impl BrowserEngine for ChromiumEngine {
    type Session = ChromiumSession;

    async fn launch(&self, mode: LaunchMode, settings: &Settings) -> Result<ChromiumSession> {
        match mode {
            LaunchMode::Headless => Self::launch_session(mode, settings).await,
            // A window that cannot come up means the deployment cannot do
            // interactive hand-off at all; surface that distinctly.
            LaunchMode::Window => Self::launch_session(mode, settings)
                .await
                .map_err(|e| Error::window_launch(e.to_string())),
        }
    }
}

/// A launched Chromium context and the page it drives
pub struct ChromiumSession {
    browser: Browser,
    handler_task: JoinHandle<()>,
    page: Page,
}

impl Drop for ChromiumSession {
    fn drop(&mut self) {
        self.handler_task.abort();
    }
}

#[async_trait]
impl BrowserSession for ChromiumSession {
    async fn goto(&self, url: &str) -> Result<()> {
        self.page
            .goto(url)
            .await
            .map_err(|e| Error::browser(format!("navigation to {url} failed: {e}")))?;
        Ok(())
    }

    async fn reload(&self) -> Result<()> {
        self.page
            .reload()
            .await
            .map_err(|e| Error::browser(format!("reload failed: {e}")))?;
        Ok(())
    }

    async fn has_selector(&self, selector: &str) -> Result<bool> {
        let expr = format!(
            "document.querySelector({}) !== null",
            serde_json::to_string(selector)?
        );
        let value: serde_json::Value = self
            .page
            .evaluate(expr)
            .await
            .map_err(|e| Error::browser(format!("selector probe failed: {e}")))?
            .into_value()
            .map_err(|e| Error::browser(format!("selector probe returned no value: {e}")))?;
        Ok(value.as_bool().unwrap_or(false))
    }

    async fn click(&self, selector: &str) -> Result<()> {
        self.page
            .find_element(selector)
            .await
            .map_err(|e| Error::browser(format!("element {selector} not found: {e}")))?
            .click()
            .await
            .map_err(|e| Error::browser(format!("click on {selector} failed: {e}")))?;
        Ok(())
    }

    async fn wait_for_network_idle(&self) -> Result<()> {
        // Bounded wait for the load event, then a short settle; redirects off
        // the portal can fire the load event more than once.
        let _ = tokio::time::timeout(NAVIGATION_TIMEOUT, self.page.wait_for_navigation()).await;
        tokio::time::sleep(NETWORK_SETTLE).await;
        Ok(())
    }

    async fn wait_for_request_to(
        &self,
        url_prefix: &str,
        timeout: Option<Duration>,
    ) -> Result<()> {
        let mut events = self
            .page
            .event_listener::<EventRequestWillBeSent>()
            .await
            .map_err(|e| Error::browser(format!("failed to listen for requests: {e}")))?;

        let wait = async {
            while let Some(event) = events.next().await {
                if event.request.url.starts_with(url_prefix) {
                    return Ok(());
                }
            }
            Err(Error::browser(
                "browser event stream ended before the expected redirect",
            ))
        };

        match timeout {
            Some(bound) => tokio::time::timeout(bound, wait).await.map_err(|_| {
                Error::browser(format!(
                    "no request to {url_prefix} within {}s",
                    bound.as_secs()
                ))
            })?,
            None => wait.await,
        }
    }

    async fn current_url(&self) -> Result<String> {
        self.page
            .url()
            .await
            .map_err(|e| Error::browser(format!("failed to read page URL: {e}")))?
            .ok_or_else(|| Error::browser("page has no URL"))
    }

    async fn page_cookies(&self) -> Result<Vec<StoredCookie>> {
        let cookies = self
            .page
            .get_cookies()
            .await
            .map_err(|e| Error::browser(format!("failed to read page cookies: {e}")))?;
        Ok(cookies.iter().map(stored_from_cdp).collect())
    }

    async fn all_cookies(&self) -> Result<Vec<StoredCookie>> {
        let response = self
            .page
            .execute(GetCookiesParams::default())
            .await
            .map_err(|e| Error::browser(format!("bulk cookie read failed: {e}")))?;
        Ok(response.result.cookies.iter().map(stored_from_cdp).collect())
    }

    async fn set_cookies(&self, cookies: Vec<StoredCookie>) -> Result<()> {
        let params: Vec<CookieParam> = cookies.iter().map(cookie_param_from).collect();
        self.page
            .set_cookies(params)
            .await
            .map_err(|e| Error::browser(format!("failed to set cookies: {e}")))?;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        if let Err(err) = self.browser.close().await {
            warn!("Browser close reported: {err}");
        }
        let _ = self.browser.wait().await;
        self.handler_task.abort();
        Ok(())
    }
}

fn browser_config(mode: LaunchMode, settings: &Settings) -> Result<BrowserConfig> {
    let overrides = match mode {
        LaunchMode::Headless => &settings.headless.launch,
        LaunchMode::Window => &settings.auth_window.launch,
    };

    let mut builder = BrowserConfig::builder();
    if let Some(executable) = &overrides.executable {
        builder = builder.chrome_executable(executable);
    }
    if let Some(dir) = &overrides.user_data_dir {
        builder = builder.user_data_dir(dir);
    }
    for arg in &overrides.args {
        builder = builder.arg(arg);
    }

    if mode == LaunchMode::Window {
        builder = builder
            .with_head()
            .arg(format!("--app={}", settings.portal.home_url))
            .arg(format!(
                "--window-size={AUTH_WINDOW_WIDTH},{AUTH_WINDOW_HEIGHT}"
            ));
    }

    builder
        .build()
        .map_err(|e| Error::browser(format!("invalid browser configuration: {e}")))
}

fn stored_from_cdp(cookie: &Cookie) -> StoredCookie {
    StoredCookie {
        name: cookie.name.clone(),
        value: cookie.value.clone(),
        domain: cookie.domain.clone(),
        path: cookie.path.clone(),
        secure: cookie.secure,
        http_only: cookie.http_only,
        same_site: cookie.same_site.as_ref().map(|s| format!("{s:?}")),
    }
}

fn cookie_param_from(cookie: &StoredCookie) -> CookieParam {
    let mut param = CookieParam::new(cookie.name.clone(), cookie.value.clone());
    param.domain = Some(cookie.domain.clone());
    param.path = Some(cookie.path.clone());
    param.secure = Some(cookie.secure);
    param.http_only = Some(cookie.http_only);
    param.same_site = cookie.same_site.as_deref().and_then(same_site_from_str);
    param
}

fn same_site_from_str(value: &str) -> Option<CookieSameSite> {
    match value {
        "Strict" => Some(CookieSameSite::Strict),
        "Lax" => Some(CookieSameSite::Lax),
        "None" => Some(CookieSameSite::None),
        _ => None,
    }
}
