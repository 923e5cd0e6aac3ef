//! Build information constants populated by `build.rs`.
//!
//! - `GIT_HASH`: Git commit hash
//! - `BUILD_TIME_UTC`: Build timestamp in RFC3339 format
//! - `RUSTC_VERSION`: Rustc version used to build the crate

/// Git commit hash of the build, or "unknown" if not available.
pub const GIT_HASH: &str = env!("LAN_DISCOVERY_GIT_HASH");

/// Build timestamp in RFC3339 format.
pub const BUILD_TIME_UTC: &str = env!("LAN_DISCOVERY_BUILD_TIME_UTC");

/// Rustc version used for the build.
pub const RUSTC_VERSION: &str = env!("LAN_DISCOVERY_RUSTC_VERSION");

/// Build information as a structured object, logged when the server starts.
#[derive(Debug, Clone, serde::Serialize)]
pub struct BuildInfo {
    /// Crate version from `Cargo.toml`
    pub version: &'static str,
    /// Git commit hash (short form)
    pub git_hash: &'static str,
    /// Build timestamp in RFC3339 format
    pub build_time_utc: &'static str,
    /// Rustc version used for the build
    pub rustc_version: &'static str,
}

impl BuildInfo {
    pub fn new() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            git_hash: GIT_HASH,
            build_time_utc: BUILD_TIME_UTC,
            rustc_version: RUSTC_VERSION,
        }
    }
}

impl Default for BuildInfo {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience function to get build information as a structured object.
pub fn get_build_info() -> BuildInfo {
    BuildInfo::new()
}
