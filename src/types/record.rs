//! Persisted session record
//!
//! The session record is the snapshot of the last known-good authenticated
//! state: the cached session token plus the full cookie jar of the browser
//! context that produced it. The record is the only state shared between the
//! headless worker context and the interactive auth window.

use serde::{Deserialize, Serialize};

/// Snapshot of the last known-good authenticated state
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SessionRecord {
    /// Last observed value of the portal session cookie, if any
    #[serde(rename = "lastAuthCookie", skip_serializing_if = "Option::is_none")]
    pub last_auth_cookie: Option<String>,

    /// Complete cookie jar of the context that last authenticated
    #[serde(default)]
    pub cookies: Vec<StoredCookie>,
}

impl SessionRecord {
    /// Create a record from a captured cookie jar and the cached token
    pub fn new(last_auth_cookie: Option<String>, cookies: Vec<StoredCookie>) -> Self {
        Self {
            last_auth_cookie,
            cookies,
        }
    }
}

/// A single browser cookie as round-tripped through the record.
///
/// Cookie validity (expiry, scope) is owned by the browser layer; this crate
/// never interprets these fields, it only shuttles them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoredCookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    pub path: String,
    pub secure: bool,
    pub http_only: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub same_site: Option<String>,
}
