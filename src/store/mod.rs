//! Cookie store persistence
//!
//! Reads and writes the session record at a configured path. A missing or
//! corrupt file is reported as "no prior session" and never as a fatal error:
//! stale persisted state must not block a retry from scratch. Writes replace
//! the previous record atomically so a concurrent reader never observes a
//! half-written record.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::{Result, types::SessionRecord};

/// File-backed store for the persisted session record
#[derive(Debug, Clone)]
pub struct CookieStore {
    path: PathBuf,
}

impl CookieStore {
    /// Create a store at the given file path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the persisted record
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the persisted session record.
    ///
    /// Returns `None` when the file does not exist or cannot be parsed; both
    /// cases behave as a cold start.
    pub async fn load(&self) -> Option<SessionRecord> {
        let content = match tokio::fs::read(&self.path).await {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!("No cookies to restore at {:?}", self.path);
                return None;
            }
            Err(err) => {
                warn!("Failed to read cookie store {:?}: {err}", self.path);
                return None;
            }
        };

        match serde_json::from_slice::<SessionRecord>(&content) {
            Ok(record) => {
                debug!(
                    "Restored session record with {} cookies from {:?}",
                    record.cookies.len(),
                    self.path
                );
                Some(record)
            }
            Err(err) => {
                warn!("Corrupt cookie store {:?}, treating as empty: {err}", self.path);
                None
            }
        }
    }

    /// Write the session record, replacing any prior content.
    ///
    /// Writes to a temporary sibling file first and renames it into place, so
    /// readers see either the old record or the new one.
    pub async fn save(&self, record: &SessionRecord) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_vec(record)?;
        let tmp_path = self.path.with_extension("tmp");
        tokio::fs::write(&tmp_path, &content).await?;
        tokio::fs::rename(&tmp_path, &self.path).await?;

        debug!(
            "Wrote session record with {} cookies to {:?}",
            record.cookies.len(),
            self.path
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StoredCookie;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn cookie(name: &str, value: &str) -> StoredCookie {
        StoredCookie {
            name: name.to_string(),
            value: value.to_string(),
            domain: ".portal.test".to_string(),
            path: "/".to_string(),
            secure: true,
            http_only: false,
            same_site: None,
        }
    }

    #[tokio::test]
    async fn test_load_missing_file_is_none() {
        let dir = TempDir::new().unwrap();
        let store = CookieStore::new(dir.path().join("session.json"));

        assert!(store.load().await.is_none());
    }

    #[tokio::test]
    async fn test_load_corrupt_file_is_none() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        tokio::fs::write(&path, b"{not json at all").await.unwrap();

        let store = CookieStore::new(&path);
        assert!(store.load().await.is_none());
    }

    #[tokio::test]
    async fn test_save_then_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = CookieStore::new(dir.path().join("session.json"));

        let record = SessionRecord::new(
            Some("tok".to_string()),
            vec![cookie("user", "tok"), cookie("lang", "en")],
        );
        store.save(&record).await.unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded, record);
    }

    #[tokio::test]
    async fn test_save_creates_parent_directory() {
        let dir = TempDir::new().unwrap();
        let store = CookieStore::new(dir.path().join("nested/deeper/session.json"));

        store
            .save(&SessionRecord::new(None, vec![cookie("a", "1")]))
            .await
            .unwrap();

        assert!(store.load().await.is_some());
    }

    #[tokio::test]
    async fn test_save_replaces_previous_record() {
        let dir = TempDir::new().unwrap();
        let store = CookieStore::new(dir.path().join("session.json"));

        store
            .save(&SessionRecord::new(Some("old".to_string()), Vec::new()))
            .await
            .unwrap();
        store
            .save(&SessionRecord::new(Some("new".to_string()), Vec::new()))
            .await
            .unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded.last_auth_cookie.as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn test_no_temp_file_left_behind() {
        let dir = TempDir::new().unwrap();
        let store = CookieStore::new(dir.path().join("session.json"));

        store.save(&SessionRecord::default()).await.unwrap();

        assert!(!dir.path().join("session.tmp").exists());
    }
}
