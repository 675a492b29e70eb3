//! SSO Session Provider
//!
//! Keeps an authenticated session against a single-sign-on-protected web
//! portal alive without repeated interactive login. A refresh silently
//! re-authenticates a headless browser from persisted cookies; only when the
//! portal forces a redirect into the external identity provider does a
//! visible browser window open so a human can complete the challenge
//! (credentials, MFA) once per expiring session.
//!
//! # Architecture
//!
//! - [`store::CookieStore`] persists the `{lastAuthCookie, cookies}` session
//!   record and tolerates missing or corrupt state.
//! - [`session::SessionBridge`] moves cookie jars between independent browser
//!   contexts through that record.
//! - [`session::AuthWindowController`] runs the interactive challenge in a
//!   visible app-mode window.
//! - [`session::AuthProvider`] is the refresh state machine tying it all
//!   together, generic over the [`browser::BrowserEngine`] capability.
//!
//! # Usage
//!
//! ```no_run
//! use sso_session_provider::{AuthProvider, Settings};
//!
//! # tokio_test::block_on(async {
//! let mut provider = AuthProvider::new(Settings::new("session.json"));
//! let token = provider.refresh().await?;
//! println!("session token: {token}");
//! # Ok::<(), sso_session_provider::Error>(())
//! # });
//! ```
//!
//! A one-shot CLI wrapping the same flow ships as the `sso-session` binary.

pub mod browser;
pub mod config;
pub mod error;
pub mod session;
pub mod store;
pub mod types;
pub mod utils;

pub use config::Settings;
pub use error::{Error, Result};
pub use session::{AuthProvider, AuthProviderGeneric, SessionBridge};
pub use store::CookieStore;
pub use types::{SessionRecord, StoredCookie};
