use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

pub mod file;
pub mod in_memory;

pub use file::FileTemplateCache;
pub use in_memory::InMemoryTemplates;

/// Name of the listing template inside each per-host directory.
pub const LISTING_FILE: &str = "index.html";

/// Template lookup and rendering errors
#[derive(Debug, Error)]
pub enum TemplateError {
    /// No template could be read for the host
    #[error("template not found for host '{host}': {source}")]
    NotFound {
        host: String,
        #[source]
        source: std::io::Error,
    },

    /// Host name cannot be mapped to a template directory
    #[error("invalid host name '{0}'")]
    InvalidHost(String),

    /// Template failed to compile or render
    #[error("render error: {0}")]
    Render(String),
}

/// Template result type
pub type TemplateResult<T> = std::result::Result<T, TemplateError>;

/// Source of per-host listing templates, keyed by request host name
#[async_trait]
pub trait TemplateSource: Send + Sync {
    /// Get the template source for `host`
    async fn get(&self, host: &str) -> TemplateResult<Arc<str>>;
}

/// Reject host names that would escape the template root.
pub(crate) fn validate_host(host: &str) -> TemplateResult<()> {
    if host.is_empty() || host.contains(['/', '\\']) || host.contains("..") {
        return Err(TemplateError::InvalidHost(host.to_string()));
    }
    Ok(())
}
