//! External book-metadata lookup against the Google Books API.
//!
//! Enrichment is strictly best-effort: any transport problem, quota
//! rejection or unexpected response shape degrades to "no enrichment",
//! never an error.

use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, error};
use url::Url;

use crate::error::Result;

const GOOGLE_BOOKS_URL: &str = "https://www.googleapis.com/books/v1/volumes";

/// Timeout for one metadata request.
const REQUEST_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VolumesResponse {
    #[serde(default)]
    total_items: u32,
    #[serde(default)]
    items: Vec<Volume>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Volume {
    volume_info: Option<VolumeInfo>,
}

/// The metadata record of the best-matching volume.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeInfo {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_links: Option<ImageLinks>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageLinks {
    #[serde(default)]
    pub thumbnail: Option<String>,
}

/// Client for the Google Books volumes endpoint.
///
/// An API key is optional; when present it is appended to every query.
pub struct GoogleBooksClient {
    client: reqwest::Client,
    base_url: Url,
    api_key: Option<String>,
}

impl GoogleBooksClient {
    /// Create a metadata client.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(api_key: Option<String>) -> Result<Self> {
        Self::with_base_url(api_key, Url::parse(GOOGLE_BOOKS_URL)?)
    }

    pub(crate) fn with_base_url(api_key: Option<String>, base_url: Url) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }

    /// Look up the best-matching volume for a title (and author, when
    /// already known).
    ///
    /// Returns `None` on any failure or when nothing matches.
    pub async fn fetch(&self, title: &str, author: Option<&str>) -> Option<VolumeInfo> {
        let mut query = format!("intitle:\"{title}\"");
        if let Some(author) = author {
            query.push_str(&format!("+inauthor:\"{author}\""));
        }

        let mut params = vec![("q", query.as_str()), ("maxResults", "1")];
        if let Some(key) = self.api_key.as_deref() {
            params.push(("key", key));
        }

        let response = match self
            .client
            .get(self.base_url.clone())
            .query(&params)
            .send()
            .await
            .and_then(|response| response.error_for_status())
        {
            Ok(response) => response,
            Err(err) => {
                error!(title, %err, "metadata request failed");
                return None;
            }
        };

        let data: VolumesResponse = match response.json().await {
            Ok(data) => data,
            Err(err) => {
                error!(title, %err, "metadata response had unexpected shape");
                return None;
            }
        };

        if data.total_items == 0 {
            debug!(title, "no metadata match");
            return None;
        }
        data.items.into_iter().next()?.volume_info
    }
}
