//! Configuration settings structure
//!
//! Defines the main settings structure and loading logic for the session
//! provider. The storage file path is the only required value; everything
//! else defaults to the production portal.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Main configuration settings for the session provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Cookie store configuration
    pub storage: StorageSettings,
    /// Protected portal configuration
    #[serde(default)]
    pub portal: PortalSettings,
    /// Interactive auth window configuration
    #[serde(default)]
    pub auth_window: AuthWindowSettings,
    /// Headless worker context configuration
    #[serde(default)]
    pub headless: HeadlessSettings,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Cookie store location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Path of the persisted session record
    pub file_path: PathBuf,
}

/// Protected portal and identity provider surface
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalSettings {
    /// Portal home URL; also the origin prefix that signals the identity
    /// provider has redirected back
    pub home_url: String,
    /// Origin prefix of the external identity provider
    pub idp_origin: String,
    /// Selector that is only present when the user must click through to the
    /// identity provider
    pub login_button_selector: String,
    /// Name of the cookie whose value is the session token
    pub session_cookie: String,
}

/// Interactive auth window behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthWindowSettings {
    /// Whether interactive hand-off is available at all
    pub enabled: bool,
    /// Optional bound on the wait for the identity provider to redirect back.
    /// Absent means wait indefinitely; interactive challenges have unbounded
    /// human-response time.
    pub redirect_timeout_secs: Option<u64>,
    /// Passthrough launch tuning for the visible window
    pub launch: LaunchOverrides,
}

/// Headless worker context behavior
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadlessSettings {
    /// Passthrough launch tuning for the headless context
    pub launch: LaunchOverrides,
}

/// Launch tuning merged with the fixed per-mode values. The headless context
/// is always headless and the auth window is always a visible, fixed-size
/// app window; overrides cannot change that.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LaunchOverrides {
    /// Explicit browser executable, if autodetection is not wanted
    pub executable: Option<PathBuf>,
    /// Persistent profile directory
    pub user_data_dir: Option<PathBuf>,
    /// Extra command-line arguments
    pub args: Vec<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level
    pub level: String,
    /// Enable verbose logging
    pub verbose: bool,
}

impl Default for PortalSettings {
    fn default() -> Self {
        Self {
            home_url: "https://intra.epitech.eu/".to_string(),
            idp_origin: "https://login.microsoftonline.com/".to_string(),
            login_button_selector:
                r#"[href^="https://login.microsoftonline.com/common/oauth2/authorize"]"#
                    .to_string(),
            session_cookie: "user".to_string(),
        }
    }
}

impl Default for AuthWindowSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            redirect_timeout_secs: None,
            launch: LaunchOverrides::default(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            verbose: false,
        }
    }
}

impl Settings {
    /// Create settings for the given cookie store path with all defaults
    pub fn new(storage_file_path: impl Into<PathBuf>) -> Self {
        Self {
            storage: StorageSettings {
                file_path: storage_file_path.into(),
            },
            portal: PortalSettings::default(),
            auth_window: AuthWindowSettings::default(),
            headless: HeadlessSettings::default(),
            logging: LoggingSettings::default(),
        }
    }

    /// Load settings from a TOML file
    pub fn from_file(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)
            .map_err(|e| crate::Error::config(format!("invalid config file: {e}")))?;
        Ok(settings)
    }

    /// Apply environment variable overrides
    pub fn merge_with_env(mut self) -> crate::Result<Self> {
        if let Ok(path) = std::env::var("SSO_STORAGE_FILE") {
            self.storage.file_path = PathBuf::from(path);
        }

        if let Ok(url) = std::env::var("SSO_PORTAL_URL") {
            self.portal.home_url = url;
        }

        if let Ok(origin) = std::env::var("SSO_IDP_ORIGIN") {
            self.portal.idp_origin = origin;
        }

        if let Ok(flag) = std::env::var("SSO_SHOW_AUTH_WINDOW") {
            self.auth_window.enabled = parse_bool(&flag)
                .ok_or_else(|| crate::Error::config(format!("Invalid SSO_SHOW_AUTH_WINDOW: {flag}")))?;
        }

        if let Ok(secs) = std::env::var("SSO_REDIRECT_TIMEOUT_SECS") {
            self.auth_window.redirect_timeout_secs = Some(
                secs.parse()
                    .map_err(|e| crate::Error::config(format!("Invalid redirect timeout: {e}")))?,
            );
        }

        Ok(self)
    }

    /// Validate the final configuration
    pub fn validate(&self) -> crate::Result<()> {
        if self.storage.file_path.as_os_str().is_empty() {
            return Err(crate::Error::config("storage.file_path must not be empty"));
        }

        for (name, value) in [
            ("portal.home_url", &self.portal.home_url),
            ("portal.idp_origin", &self.portal.idp_origin),
        ] {
            let parsed = url::Url::parse(value)
                .map_err(|e| crate::Error::config(format!("{name} is not a valid URL: {e}")))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(crate::Error::config(format!(
                    "{name} must be an http(s) URL, got {value}"
                )));
            }
        }

        if self.portal.login_button_selector.trim().is_empty() {
            return Err(crate::Error::config(
                "portal.login_button_selector must not be empty",
            ));
        }

        if self.portal.session_cookie.trim().is_empty() {
            return Err(crate::Error::config("portal.session_cookie must not be empty"));
        }

        Ok(())
    }

    /// Bound on the interactive redirect wait, if one is configured
    pub fn redirect_timeout(&self) -> Option<Duration> {
        self.auth_window.redirect_timeout_secs.map(Duration::from_secs)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}
