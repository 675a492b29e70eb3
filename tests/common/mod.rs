//! Common test utilities and helpers
//!
//! Scripted browser engine and session used to drive the refresh state
//! machine without a real browser. Each session answers from a per-call
//! script and records what the provider did to it.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use sso_session_provider::{
    Error, Result, StoredCookie,
    browser::{BrowserEngine, BrowserSession, LaunchMode},
    config::Settings,
};

/// Scripted answers and observation counters for one browser session
#[derive(Default)]
pub struct SessionScript {
    /// Successive answers for the login-button probe; exhausted means absent
    pub login_button: Mutex<VecDeque<bool>>,
    /// URL the session reports after the post-click network idle
    pub url_after_idle: Mutex<String>,
    /// The session's cookie jar; injection replaces by name, capture reads
    pub jar: Mutex<Vec<StoredCookie>>,
    /// Error message every click raises, if set
    pub click_error: Mutex<Option<String>>,
    /// Navigated URLs in order
    pub goto_log: Mutex<Vec<String>>,
    /// Prefixes the provider waited on for the portal redirect
    pub redirect_waits: Mutex<Vec<String>>,
    pub reload_count: AtomicUsize,
    pub close_count: AtomicUsize,
}

impl SessionScript {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn login_button_answers(self: Arc<Self>, answers: &[bool]) -> Arc<Self> {
        *self.login_button.lock().unwrap() = answers.iter().copied().collect();
        self
    }

    pub fn url_after_idle(self: Arc<Self>, url: &str) -> Arc<Self> {
        *self.url_after_idle.lock().unwrap() = url.to_string();
        self
    }

    pub fn with_jar(self: Arc<Self>, cookies: Vec<StoredCookie>) -> Arc<Self> {
        *self.jar.lock().unwrap() = cookies;
        self
    }

    pub fn fail_clicks(self: Arc<Self>, message: &str) -> Arc<Self> {
        *self.click_error.lock().unwrap() = Some(message.to_string());
        self
    }

    pub fn closes(&self) -> usize {
        self.close_count.load(Ordering::SeqCst)
    }
}

/// Session handle the provider drives; all behavior comes from the script
pub struct ScriptedSession {
    script: Arc<SessionScript>,
}

#[async_trait]
impl BrowserSession for ScriptedSession {
    async fn goto(&self, url: &str) -> Result<()> {
        self.script.goto_log.lock().unwrap().push(url.to_string());
        Ok(())
    }

    async fn reload(&self) -> Result<()> {
        self.script.reload_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn has_selector(&self, _selector: &str) -> Result<bool> {
        Ok(self
            .script
            .login_button
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(false))
    }

    async fn click(&self, _selector: &str) -> Result<()> {
        if let Some(message) = self.script.click_error.lock().unwrap().clone() {
            return Err(Error::browser(message));
        }
        Ok(())
    }

    async fn wait_for_network_idle(&self) -> Result<()> {
        Ok(())
    }

    async fn wait_for_request_to(
        &self,
        url_prefix: &str,
        _timeout: Option<Duration>,
    ) -> Result<()> {
        self.script
            .redirect_waits
            .lock()
            .unwrap()
            .push(url_prefix.to_string());
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.script.url_after_idle.lock().unwrap().clone())
    }

    async fn page_cookies(&self) -> Result<Vec<StoredCookie>> {
        Ok(self.script.jar.lock().unwrap().clone())
    }

    async fn all_cookies(&self) -> Result<Vec<StoredCookie>> {
        Ok(self.script.jar.lock().unwrap().clone())
    }

    async fn set_cookies(&self, cookies: Vec<StoredCookie>) -> Result<()> {
        let mut jar = self.script.jar.lock().unwrap();
        for cookie in cookies {
            jar.retain(|existing| existing.name != cookie.name);
            jar.push(cookie);
        }
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.script.close_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Engine handing out scripted sessions and counting launches
pub struct ScriptedEngine {
    pub headless: Arc<SessionScript>,
    pub window: Option<Arc<SessionScript>>,
    pub headless_launches: Arc<AtomicUsize>,
    pub window_launches: Arc<AtomicUsize>,
    pub window_launch_error: Option<String>,
}

impl ScriptedEngine {
    pub fn new(headless: Arc<SessionScript>) -> Self {
        Self {
            headless,
            window: None,
            headless_launches: Arc::new(AtomicUsize::new(0)),
            window_launches: Arc::new(AtomicUsize::new(0)),
            window_launch_error: None,
        }
    }

    pub fn with_window(mut self, window: Arc<SessionScript>) -> Self {
        self.window = Some(window);
        self
    }

    pub fn failing_window_launch(mut self, message: &str) -> Self {
        self.window_launch_error = Some(message.to_string());
        self
    }

    /// Counter handles that stay readable after the engine moves into the
    /// provider
    pub fn counters(&self) -> (Arc<AtomicUsize>, Arc<AtomicUsize>) {
        (self.headless_launches.clone(), self.window_launches.clone())
    }
}

#[async_trait]
impl BrowserEngine for ScriptedEngine {
    type Session = ScriptedSession;

    async fn launch(&self, mode: LaunchMode, _settings: &Settings) -> Result<ScriptedSession> {
        match mode {
            LaunchMode::Headless => {
                self.headless_launches.fetch_add(1, Ordering::SeqCst);
                Ok(ScriptedSession {
                    script: self.headless.clone(),
                })
            }
            LaunchMode::Window => {
                if let Some(message) = &self.window_launch_error {
                    return Err(Error::window_launch(message.clone()));
                }
                self.window_launches.fetch_add(1, Ordering::SeqCst);
                match &self.window {
                    Some(script) => Ok(ScriptedSession {
                        script: script.clone(),
                    }),
                    None => Err(Error::window_launch("no window session scripted")),
                }
            }
        }
    }
}

/// Plain portal cookie for test jars
pub fn cookie(name: &str, value: &str) -> StoredCookie {
    StoredCookie {
        name: name.to_string(),
        value: value.to_string(),
        domain: ".intra.epitech.eu".to_string(),
        path: "/".to_string(),
        secure: true,
        http_only: true,
        same_site: Some("Lax".to_string()),
    }
}
