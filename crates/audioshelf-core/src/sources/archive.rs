//! Archive.org source backed by the official JSON API.
//!
//! Searches the LibriVox collection through the advanced-search endpoint
//! and resolves chapters from the per-identifier metadata document. No
//! HTML is scraped; the archive root is fixed regardless of what the
//! configuration says.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, error, info};
use url::Url;

use crate::client::SourceClient;
use crate::error::Result;
use crate::source::AudioSource;
use crate::types::{AudioItem, Audiobook, Chapter};

const ARCHIVE_ROOT: &str = "https://archive.org";

/// Collection the search is restricted to
const SEARCH_COLLECTION: &str = "librivoxaudio";

/// Maximum number of search rows requested
const SEARCH_ROWS: &str = "50";

/// Playable file extensions
const AUDIO_EXTENSIONS: [&str; 2] = [".mp3", ".ogg"];

/// Markers of lower-quality derived transcodes that duplicate the
/// primary files
const LOW_QUALITY_MARKERS: [&str; 2] = ["64kb", "128kb"];

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    response: SearchBody,
}

#[derive(Debug, Default, Deserialize)]
struct SearchBody {
    #[serde(default)]
    docs: Vec<SearchDoc>,
}

#[derive(Debug, Deserialize)]
struct SearchDoc {
    identifier: Option<String>,
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MetadataResponse {
    #[serde(default)]
    files: Vec<FileEntry>,
    #[serde(default)]
    metadata: BookMetadata,
}

#[derive(Debug, Deserialize)]
struct FileEntry {
    name: Option<String>,
    title: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct BookMetadata {
    title: Option<String>,
    creator: Option<String>,
    description: Option<String>,
}

/// Fixed client for the archive.org audiobook collection.
pub struct ArchiveSource {
    name: String,
    root: Url,
    client: SourceClient,
}

impl ArchiveSource {
    /// Create an archive source. The archive root is hardcoded; any
    /// configured base URL is ignored.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        Self::with_root(name, Url::parse(ARCHIVE_ROOT)?)
    }

    fn with_root(name: impl Into<String>, root: Url) -> Result<Self> {
        Ok(Self {
            name: name.into(),
            root,
            client: SourceClient::new()?,
        })
    }

    /// Last path segment of an item URL, which is the archive identifier
    /// by the `/details/{identifier}` convention.
    fn identifier_of(item: &AudioItem) -> Option<&str> {
        let identifier = item.url.rsplit('/').next()?.trim();
        if identifier.is_empty() {
            None
        } else {
            Some(identifier)
        }
    }
}

#[async_trait]
impl AudioSource for ArchiveSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn base_url(&self) -> &Url {
        &self.root
    }

    async fn search(&self, query: &str) -> Result<Vec<AudioItem>> {
        let url = self.root.join("advancedsearch.php")?;
        let q = format!("collection:{SEARCH_COLLECTION} AND title:({query})");
        debug!(source = %self.name, query, "searching archive");

        let response: SearchResponse = self
            .client
            .fetch_json(
                &url,
                &[
                    ("q", q.as_str()),
                    ("fl[]", "identifier"),
                    ("fl[]", "title"),
                    ("fl[]", "creator"),
                    ("output", "json"),
                    ("rows", SEARCH_ROWS),
                ],
            )
            .await?;

        let items = response
            .response
            .docs
            .into_iter()
            .filter_map(|doc| {
                let identifier = doc.identifier?;
                let url = self.root.join(&format!("details/{identifier}")).ok()?;
                Some(AudioItem {
                    title: doc.title.unwrap_or_else(|| "Unknown Title".to_string()),
                    source_name: self.name.clone(),
                    url: url.to_string(),
                })
            })
            .collect();

        Ok(items)
    }

    async fn get_details(&self, item: &AudioItem) -> Option<Audiobook> {
        let identifier = Self::identifier_of(item)?;
        info!(source = %self.name, identifier, "fetching archive metadata");

        let url = self.root.join(&format!("metadata/{identifier}")).ok()?;
        let response: MetadataResponse = match self.client.fetch_json(&url, &[]).await {
            Ok(response) => response,
            Err(err) => {
                error!(source = %self.name, identifier, %err, "could not fetch metadata");
                return None;
            }
        };

        let chapters = collect_chapters(&self.root, identifier, &response.files);
        if chapters.is_empty() {
            debug!(source = %self.name, identifier, "no playable files in item");
            return None;
        }

        let cover = self.root.join(&format!("services/img/{identifier}")).ok()?;
        Some(Audiobook {
            title: response
                .metadata
                .title
                .unwrap_or_else(|| item.title.clone()),
            source_name: self.name.clone(),
            url: item.url.clone(),
            author: Some(
                response
                    .metadata
                    .creator
                    .unwrap_or_else(|| "Unknown".to_string()),
            ),
            description: response.metadata.description,
            cover_image_url: Some(cover.to_string()),
            chapters,
        })
    }
}

/// Whether a file name denotes a primary-quality playable audio file.
fn is_primary_audio_file(name: &str) -> bool {
    AUDIO_EXTENSIONS.iter().any(|ext| name.ends_with(ext))
        && !LOW_QUALITY_MARKERS.iter().any(|marker| name.contains(marker))
}

/// Filter the file list down to playable chapters, sorted by title.
///
/// The archive's raw file order is not track order; filename-derived
/// titles sort into the correct sequence for this collection's naming
/// convention.
fn collect_chapters(root: &Url, identifier: &str, files: &[FileEntry]) -> Vec<Chapter> {
    let mut chapters: Vec<Chapter> = files
        .iter()
        .filter_map(|file| {
            let name = file.name.as_deref()?;
            if !is_primary_audio_file(name) {
                return None;
            }
            let title = file
                .title
                .as_deref()
                .filter(|title| !title.trim().is_empty())
                .unwrap_or_else(|| name.rsplit('/').next().unwrap_or(name));
            let url = root.join(&format!("download/{identifier}/{name}")).ok()?;
            Some(Chapter {
                title: title.trim().to_string(),
                url: url.to_string(),
            })
        })
        .collect();

    chapters.sort_by(|a, b| a.title.cmp(&b.title));
    chapters
}
