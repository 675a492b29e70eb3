//! Configuration loading utilities
//!
//! Provides helper functions for loading configuration from various sources
//! with proper error handling and validation.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::{Result, config::Settings};

/// Configuration loader with multiple source support
#[derive(Debug)]
pub struct ConfigLoader {
    /// Fallback cookie store path when neither file nor environment set one
    default_storage_path: PathBuf,
}

impl ConfigLoader {
    /// Create new configuration loader
    pub fn new(default_storage_path: impl Into<PathBuf>) -> Self {
        Self {
            default_storage_path: default_storage_path.into(),
        }
    }

    /// Load configuration with precedence order:
    /// 1. Environment variables (highest priority)
    /// 2. Configuration file
    /// 3. Default values (lowest priority)
    pub fn load(&self, config_file: Option<&Path>) -> Result<Settings> {
        let mut settings = Settings::new(&self.default_storage_path);

        if let Some(path) = config_file {
            if path.exists() {
                info!("Loading configuration from file: {:?}", path);
                settings = Settings::from_file(path)?;
            } else {
                warn!("Configuration file not found: {:?}, using defaults", path);
            }
        }

        debug!("Applying environment variable overrides");
        settings = settings.merge_with_env()?;

        settings.validate()?;

        debug!("Final configuration: {:?}", settings);
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_defaults() {
        let loader = ConfigLoader::new("/tmp/default-session.json");
        let settings = loader.load(None).unwrap();

        assert_eq!(
            settings.storage.file_path,
            PathBuf::from("/tmp/default-session.json")
        );
        assert!(settings.auth_window.enabled);
    }

    #[test]
    fn test_load_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[storage]
file_path = "/var/lib/sso/session.json"

[auth_window]
enabled = false
redirect_timeout_secs = 120

[portal]
session_cookie = "sid"
        "#
        )
        .unwrap();

        let loader = ConfigLoader::new("/tmp/default-session.json");
        let settings = loader.load(Some(temp_file.path())).unwrap();

        assert_eq!(
            settings.storage.file_path,
            PathBuf::from("/var/lib/sso/session.json")
        );
        assert!(!settings.auth_window.enabled);
        assert_eq!(settings.auth_window.redirect_timeout_secs, Some(120));
        assert_eq!(settings.portal.session_cookie, "sid");
        // Unlisted sections keep their defaults
        assert!(settings.portal.home_url.starts_with("https://"));
    }

    #[test]
    fn test_env_var_override() {
        unsafe {
            std::env::set_var("SSO_PORTAL_URL", "https://portal.example.test/");
            std::env::set_var("SSO_IDP_ORIGIN", "https://idp.example.test/");
        }

        let loader = ConfigLoader::new("/tmp/default-session.json");
        let settings = loader.load(None).unwrap();

        assert_eq!(settings.portal.home_url, "https://portal.example.test/");
        assert_eq!(settings.portal.idp_origin, "https://idp.example.test/");

        unsafe {
            std::env::remove_var("SSO_PORTAL_URL");
            std::env::remove_var("SSO_IDP_ORIGIN");
        }
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let loader = ConfigLoader::new("/tmp/default-session.json");
        let settings = loader
            .load(Some(Path::new("/nonexistent/config.toml")))
            .unwrap();

        assert_eq!(
            settings.storage.file_path,
            PathBuf::from("/tmp/default-session.json")
        );
    }
}
