//! Session refresh for the SSO-protected portal
//!
//! This module holds the refresh state machine and its collaborators: the
//! [`SessionBridge`] that moves cookies between browser contexts through the
//! persisted record, the [`AuthWindowController`] that runs the interactive
//! identity-provider challenge, and the [`AuthProvider`] orchestrating both.

pub mod auth_window;
pub mod bridge;
pub mod provider;

pub use auth_window::AuthWindowController;
pub use bridge::SessionBridge;
pub use provider::{AuthProvider, AuthProviderGeneric};
