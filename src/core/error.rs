//! Crate-level error type.
//!
//! Each layer owns a narrow `thiserror` enum; this module folds them into a
//! single [`Error`] for callers that drive the whole service.

use thiserror::Error;

use crate::core::config::ConfigError;
use crate::services::server::ServerError;

/// Top-level error returned by [`crate::run`] and friends.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be loaded or is invalid.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The HTTP server failed to bind or terminated abnormally.
    #[error("server error: {0}")]
    Server(#[from] ServerError),
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
