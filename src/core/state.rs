use std::sync::Arc;

use crate::data::cache::TemplateSource;
use crate::data::registry::Registry;

/// Shared application state handed to every request handler.
///
/// Cloning is cheap: the registry and the template source are reference
/// counted, so all clones observe the same devices.
#[derive(Clone)]
pub struct AppState {
    registry: Arc<Registry>,
    templates: Arc<dyn TemplateSource>,
    trust_proxy: bool,
}

impl AppState {
    /// Create a new `AppState`. Proxy headers are trusted by default.
    pub fn new(registry: Arc<Registry>, templates: Arc<dyn TemplateSource>) -> Self {
        Self {
            registry,
            templates,
            trust_proxy: true,
        }
    }

    /// Choose whether `X-Forwarded-For` determines the client address.
    pub fn with_trust_proxy(mut self, trust_proxy: bool) -> Self {
        self.trust_proxy = trust_proxy;
        self
    }

    /// Returns the device registry.
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Returns the listing template source.
    pub fn templates(&self) -> &Arc<dyn TemplateSource> {
        &self.templates
    }

    pub fn trust_proxy(&self) -> bool {
        self.trust_proxy
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("partitions", &self.registry.partition_count())
            .field("trust_proxy", &self.trust_proxy)
            .finish_non_exhaustive()
    }
}
