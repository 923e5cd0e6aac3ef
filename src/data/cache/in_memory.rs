use async_trait::async_trait;
use std::collections::HashMap;
use std::io;
use std::sync::Arc;

use super::{TemplateError, TemplateResult, TemplateSource};

/// Fixed set of templates held in memory, used by tests and embedders that
/// ship their listing page inside the binary.
#[derive(Debug, Default, Clone)]
pub struct InMemoryTemplates {
    templates: HashMap<String, Arc<str>>,
}

impl InMemoryTemplates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_template(mut self, host: impl Into<String>, source: impl AsRef<str>) -> Self {
        self.templates.insert(host.into(), Arc::from(source.as_ref()));
        self
    }
}

#[async_trait]
impl TemplateSource for InMemoryTemplates {
    async fn get(&self, host: &str) -> TemplateResult<Arc<str>> {
        self.templates
            .get(host)
            .cloned()
            .ok_or_else(|| TemplateError::NotFound {
                host: host.to_string(),
                source: io::Error::new(io::ErrorKind::NotFound, "no template registered"),
            })
    }
}
