//! Type definitions for the session provider
//!
//! This module contains the persisted session record and the cookie shape
//! exchanged with the browser layer.

pub mod record;

pub use record::{SessionRecord, StoredCookie};
