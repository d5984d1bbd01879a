//! Source registry and factory.
//!
//! Builds `AudioSource` trait objects from raw configuration records.
//! Invalid records are logged and dropped; one malformed entry never
//! aborts loading the rest. The registry is built once per session and
//! read-only afterwards.

use std::sync::Arc;

use tracing::warn;
use url::Url;

use crate::config::SourceConfig;
use crate::source::AudioSource;
use crate::sources::{ArchiveSource, CustomSource};

/// Build one source from a configuration record.
///
/// Dispatches on the record's `type`:
/// - `archive` needs only a name; a configured base URL is ignored.
/// - `custom` needs a name, an absolute base URL and a rule set.
/// - anything else is rejected.
///
/// Returns `None` for every invalid record, with the reason logged.
pub fn build_source(config: &SourceConfig) -> Option<Arc<dyn AudioSource>> {
    match config.source_type.as_str() {
        "archive" => {
            let Some(name) = config.name.as_deref() else {
                warn!("skipping archive source without a name");
                return None;
            };
            match ArchiveSource::new(name) {
                Ok(source) => Some(Arc::new(source)),
                Err(err) => {
                    warn!(source = name, %err, "could not create archive source");
                    None
                }
            }
        }
        "custom" => {
            let Some(name) = config.name.as_deref() else {
                warn!("skipping custom source without a name");
                return None;
            };
            let Some(base_url) = config.base_url.as_deref() else {
                warn!(source = name, "skipping custom source without a base_url");
                return None;
            };
            let base_url = match Url::parse(base_url) {
                Ok(url) => url,
                Err(err) => {
                    warn!(source = name, base_url, %err, "skipping custom source with invalid base_url");
                    return None;
                }
            };
            let Some(rules) = config.rules.clone() else {
                warn!(source = name, "skipping custom source without rules");
                return None;
            };
            match CustomSource::new(name, base_url, rules) {
                Ok(source) => Some(Arc::new(source)),
                Err(err) => {
                    warn!(source = name, %err, "could not create custom source");
                    None
                }
            }
        }
        other => {
            warn!(source_type = other, "skipping source with unknown type");
            None
        }
    }
}

/// The set of sources available to a session.
pub struct SourceRegistry {
    sources: Vec<Arc<dyn AudioSource>>,
}

impl SourceRegistry {
    /// Build a registry from configuration records, dropping invalid
    /// ones.
    pub fn from_configs(configs: &[SourceConfig]) -> Self {
        let sources = configs.iter().filter_map(build_source).collect();
        Self { sources }
    }

    /// Build a registry from already-constructed sources, for callers
    /// that assemble sources programmatically.
    pub fn from_sources(sources: Vec<Arc<dyn AudioSource>>) -> Self {
        Self { sources }
    }

    /// All registered sources, in registration order.
    pub fn sources(&self) -> &[Arc<dyn AudioSource>] {
        &self.sources
    }

    /// Look a source up by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn AudioSource>> {
        self.sources
            .iter()
            .find(|source| source.name() == name)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Close every source. Idempotent.
    pub async fn close_all(&self) {
        for source in &self.sources {
            source.close().await;
        }
    }
}
