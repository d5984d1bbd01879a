//! Source configuration loading.
//!
//! Sources are described in a YAML file with a top-level `sources` list.
//! Loading is deliberately forgiving: a missing or unparseable file yields
//! an empty list, and a malformed entry is dropped without affecting its
//! siblings. Validation of the surviving records happens at registry-build
//! time, not here.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{error, warn};

/// One raw source record from the configuration file.
///
/// Fields are optional so that an incomplete record can be reported and
/// skipped by the registry instead of failing the whole file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Source kind: `custom` (rule-driven scraper) or `archive`
    #[serde(rename = "type", default = "default_source_type")]
    pub source_type: String,
    /// Display name, also used to route detail fetches
    pub name: Option<String>,
    /// Base URL scraping rules resolve against
    pub base_url: Option<String>,
    /// Scraping rules for `custom` sources
    pub rules: Option<ScrapingRules>,
}

fn default_source_type() -> String {
    "custom".to_string()
}

/// The complete rule set of a rule-driven source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapingRules {
    pub search: SearchRules,
    pub details: DetailRules,
}

/// Selectors and URL template driving a source's search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRules {
    /// URL template containing a `{query}` placeholder, resolved against
    /// the source's base URL
    pub url: String,
    /// Selector matching one element per search result
    pub item_container_selector: String,
    /// Selector for the title element inside a result container
    pub title_selector: String,
    /// Selector for the link element inside a result container
    pub url_selector: String,
}

/// Selectors driving a source's detail fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailRules {
    /// Selector matching one element per chapter
    pub chapter_container_selector: String,
    /// Selector for the audio element inside a chapter container
    pub chapter_url_selector: String,
    #[serde(default)]
    pub author_selector: Option<String>,
    #[serde(default)]
    pub description_selector: Option<String>,
    #[serde(default)]
    pub cover_image_url_selector: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SourcesFile {
    #[serde(default)]
    sources: Vec<serde_yaml::Value>,
}

/// Load source records from a YAML file.
///
/// Returns an empty list when the file is missing, unreadable or not
/// valid YAML. Entries that fail to deserialize are logged and dropped;
/// the rest load normally.
pub fn load_sources_from_yaml(path: impl AsRef<Path>) -> Vec<SourceConfig> {
    let path = path.as_ref();
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) => {
            error!(path = %path.display(), %err, "could not read sources file");
            return Vec::new();
        }
    };

    let file: SourcesFile = match serde_yaml::from_str(&text) {
        Ok(file) => file,
        Err(err) => {
            error!(path = %path.display(), %err, "could not parse sources file");
            return Vec::new();
        }
    };

    file.sources
        .into_iter()
        .enumerate()
        .filter_map(|(idx, value)| match serde_yaml::from_value(value) {
            Ok(config) => Some(config),
            Err(err) => {
                warn!(entry = idx, %err, "skipping malformed source entry");
                None
            }
        })
        .collect()
}
