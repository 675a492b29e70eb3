//! Cookie bridging between browser contexts
//!
//! A login performed in one browser context becomes visible in another only
//! through the persisted session record: capture writes a context's complete
//! jar to the store, apply injects the stored jar into a different context.
//! No page or process handles are ever shared between the two contexts.

use tracing::{debug, warn};

use crate::{
    Result,
    browser::BrowserSession,
    store::CookieStore,
    types::SessionRecord,
};

/// Moves cookie state between browser contexts via the cookie store
#[derive(Debug, Clone)]
pub struct SessionBridge {
    store: CookieStore,
}

impl SessionBridge {
    /// Create a bridge over the given store
    pub fn new(store: CookieStore) -> Self {
        Self { store }
    }

    /// The underlying cookie store
    pub fn store(&self) -> &CookieStore {
        &self.store
    }

    /// Inject the persisted cookie jar into a browser session.
    ///
    /// No-op when no record exists. When a record is present the cached token
    /// slot is updated to the record's token before injection. Injection
    /// failures (malformed or expired cookies) are logged and absorbed so a
    /// bad jar degrades to a cold start instead of aborting the caller.
    pub async fn apply_to<S: BrowserSession>(&self, session: &S, cached_token: &mut Option<String>) {
        let Some(record) = self.store.load().await else {
            return;
        };

        *cached_token = record.last_auth_cookie.clone();
        debug!("Restoring {} cookies into browser session", record.cookies.len());
        if let Err(err) = session.set_cookies(record.cookies).await {
            warn!("Could not restore cookies, continuing unauthenticated: {err}");
        }
    }

    /// Capture a session's complete cookie jar into the store.
    ///
    /// This is the only write path for session records; the persisted jar
    /// always reflects the context that just reached an authenticated state.
    pub async fn capture_from<S: BrowserSession>(
        &self,
        session: &S,
        cached_token: Option<&str>,
    ) -> Result<()> {
        let cookies = session.all_cookies().await?;
        debug!("Capturing {} cookies from browser session", cookies.len());
        let record = SessionRecord::new(cached_token.map(str::to_string), cookies);
        self.store.save(&record).await
    }
}
