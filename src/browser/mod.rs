//! Browser automation capability
//!
//! The session provider drives a browser but does not implement one. This
//! module defines the capability seam it consumes: an engine that launches
//! contexts and a session handle exposing the page, cookie, and wait
//! operations the refresh flow needs. Production code uses the
//! chromiumoxide-backed [`ChromiumEngine`]; tests substitute scripted
//! implementations.

pub mod chromium;

use std::time::Duration;

use async_trait::async_trait;

use crate::{Result, config::Settings, types::StoredCookie};

pub use chromium::{ChromiumEngine, ChromiumSession};

/// The two context flavors the refresh flow launches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchMode {
    /// Invisible worker context for silent login attempts
    Headless,
    /// Visible, fixed-size app window for the interactive challenge
    Window,
}

/// Launches browser contexts
#[async_trait]
pub trait BrowserEngine: Send + Sync {
    /// Handle to a launched context and its page
    type Session: BrowserSession;

    /// Launch a context of the given flavor.
    ///
    /// Launch overrides from the settings are merged with fixed per-mode
    /// values: the headless context is always headless, the window is always
    /// a visible app window at the portal root.
    async fn launch(&self, mode: LaunchMode, settings: &Settings) -> Result<Self::Session>;
}

/// A launched browser context with its active page
#[async_trait]
pub trait BrowserSession: Send + Sync {
    /// Navigate the page to a URL
    async fn goto(&self, url: &str) -> Result<()>;

    /// Reload the current page
    async fn reload(&self) -> Result<()>;

    /// Whether the selector currently matches an element
    async fn has_selector(&self, selector: &str) -> Result<bool>;

    /// Click the first element matching the selector
    async fn click(&self, selector: &str) -> Result<()>;

    /// Wait until in-flight network activity has settled
    async fn wait_for_network_idle(&self) -> Result<()>;

    /// Suspend until the page issues an outbound request whose URL starts
    /// with the given prefix. `None` waits indefinitely.
    async fn wait_for_request_to(&self, url_prefix: &str, timeout: Option<Duration>)
    -> Result<()>;

    /// URL of the page's main frame
    async fn current_url(&self) -> Result<String>;

    /// Cookies visible to the current page
    async fn page_cookies(&self) -> Result<Vec<StoredCookie>>;

    /// The context's complete cookie jar, read through the low-level debug
    /// session rather than the page
    async fn all_cookies(&self) -> Result<Vec<StoredCookie>>;

    /// Inject cookies into the context
    async fn set_cookies(&self, cookies: Vec<StoredCookie>) -> Result<()>;

    /// Close the context and release the browser process
    async fn close(&mut self) -> Result<()>;
}
