use async_trait::async_trait;
use dashmap::DashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use super::{validate_host, TemplateError, TemplateResult, TemplateSource, LISTING_FILE};

/// File-backed template source reading `<root>/<host>/index.html`.
///
/// Successful reads are cached for the lifetime of the process; failed reads
/// are not, so a template added after startup is picked up on the next request.
#[derive(Debug)]
pub struct FileTemplateCache {
    root: PathBuf,
    entries: DashMap<String, Arc<str>>,
}

impl FileTemplateCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            entries: DashMap::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Number of hosts whose template is cached.
    pub fn cached_hosts(&self) -> usize {
        self.entries.len()
    }

    fn template_path(&self, host: &str) -> PathBuf {
        self.root.join(host).join(LISTING_FILE)
    }
}

#[async_trait]
impl TemplateSource for FileTemplateCache {
    async fn get(&self, host: &str) -> TemplateResult<Arc<str>> {
        let cached = self.entries.get(host).map(|hit| hit.value().clone());
        if let Some(source) = cached {
            return Ok(source);
        }

        validate_host(host)?;
        let path = self.template_path(host);
        let source = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| TemplateError::NotFound {
                host: host.to_string(),
                source,
            })?;

        debug!(host, path = %path.display(), "cached listing template");
        let source: Arc<str> = Arc::from(source);
        self.entries
            .entry(host.to_string())
            .or_insert_with(|| source.clone());
        Ok(source)
    }
}
