//! Version information

/// Crate version as compiled
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Human-readable version string
pub fn get_version() -> String {
    format!("{} v{}", env!("CARGO_PKG_NAME"), VERSION)
}
