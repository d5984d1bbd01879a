//! Rule-driven source scraping an arbitrary HTML site.

use async_trait::async_trait;
use tracing::{debug, error, info};
use url::Url;

use crate::client::SourceClient;
use crate::config::ScrapingRules;
use crate::error::Result;
use crate::parser::{parse_book_details, parse_search_results};
use crate::source::AudioSource;
use crate::types::{AudioItem, Audiobook};

/// An audio source driven entirely by declarative scraping rules,
/// requiring no per-site code.
pub struct CustomSource {
    name: String,
    base_url: Url,
    rules: ScrapingRules,
    client: SourceClient,
}

impl CustomSource {
    /// Create a source from its name, base URL and rule set.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(name: impl Into<String>, base_url: Url, rules: ScrapingRules) -> Result<Self> {
        Ok(Self::with_client(name, base_url, rules, SourceClient::new()?))
    }

    /// Create a source with a pre-configured client.
    ///
    /// Useful for testing or when a site needs different rate limits.
    pub fn with_client(
        name: impl Into<String>,
        base_url: Url,
        rules: ScrapingRules,
        client: SourceClient,
    ) -> Self {
        Self {
            name: name.into(),
            base_url,
            rules,
            client,
        }
    }

    /// Substitute the query into the rule's URL template and resolve it
    /// against the base URL.
    fn search_url(&self, query: &str) -> Result<Url> {
        let encoded = urlencoding::encode(query);
        let path = self.rules.search.url.replace("{query}", &encoded);
        Ok(self.base_url.join(&path)?)
    }
}

#[async_trait]
impl AudioSource for CustomSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn base_url(&self) -> &Url {
        &self.base_url
    }

    async fn search(&self, query: &str) -> Result<Vec<AudioItem>> {
        let url = match self.search_url(query) {
            Ok(url) => url,
            Err(err) => {
                error!(source = %self.name, %err, "could not build search URL");
                return Ok(Vec::new());
            }
        };
        debug!(source = %self.name, %url, "fetching search URL");

        let html = match self.client.fetch_html(&url).await {
            Ok(html) => html,
            Err(err) => {
                error!(source = %self.name, %err, "search request failed");
                return Ok(Vec::new());
            }
        };

        Ok(parse_search_results(
            &html,
            &self.rules.search,
            &self.base_url,
            &self.name,
        ))
    }

    async fn get_details(&self, item: &AudioItem) -> Option<Audiobook> {
        info!(source = %self.name, title = %item.title, url = %item.url, "fetching details");

        let url = match Url::parse(&item.url) {
            Ok(url) => url,
            Err(err) => {
                error!(source = %self.name, url = %item.url, %err, "item URL is not valid");
                return None;
            }
        };

        let html = match self.client.fetch_html(&url).await {
            Ok(html) => html,
            Err(err) => {
                error!(source = %self.name, url = %item.url, %err, "could not fetch details");
                return None;
            }
        };

        Some(parse_book_details(&html, &self.rules.details, item))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DetailRules, SearchRules};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn rules() -> ScrapingRules {
        ScrapingRules {
            search: SearchRules {
                url: "/search?q={query}".to_string(),
                item_container_selector: ".result".to_string(),
                title_selector: ".title".to_string(),
                url_selector: "a".to_string(),
            },
            details: DetailRules {
                chapter_container_selector: ".chapter".to_string(),
                chapter_url_selector: "audio".to_string(),
                author_selector: Some(".author".to_string()),
                description_selector: None,
                cover_image_url_selector: None,
            },
        }
    }

    async fn source_for(server: &MockServer) -> CustomSource {
        let base_url = Url::parse(&server.uri()).unwrap();
        CustomSource::new("Example", base_url, rules()).unwrap()
    }

    #[tokio::test]
    async fn test_search_emits_items_with_resolved_urls() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", "moby dick"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"
                <div class="result">
                    <span class="title">Moby Dick</span>
                    <a href="/book/42">open</a>
                </div>
                "#,
            ))
            .mount(&server)
            .await;

        let source = source_for(&server).await;
        let items = source.search("moby dick").await.unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Moby Dick");
        assert_eq!(items[0].url, format!("{}/book/42", server.uri()));
        assert_eq!(items[0].source_name, "Example");
    }

    #[tokio::test]
    async fn test_search_request_failure_degrades_to_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let source = source_for(&server).await;
        let items = source.search("anything").await.unwrap();

        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_get_details_parses_chapters_and_metadata() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/book/42"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"
                <div class="author">Herman Melville</div>
                <div class="chapter"><audio src="https://cdn.example.com/1.mp3"></audio></div>
                "#,
            ))
            .mount(&server)
            .await;

        let source = source_for(&server).await;
        let item = AudioItem {
            title: "Moby Dick".to_string(),
            source_name: "Example".to_string(),
            url: format!("{}/book/42", server.uri()),
        };

        let book = source.get_details(&item).await.unwrap();

        assert_eq!(book.author.as_deref(), Some("Herman Melville"));
        assert_eq!(book.chapters.len(), 1);
        assert_eq!(book.chapters[0].url, "https://cdn.example.com/1.mp3");
    }

    #[tokio::test]
    async fn test_get_details_request_failure_yields_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        // High request rate so the retry backoff does not stall the test
        let client = SourceClient::with_config(crate::client::ClientConfig {
            requests_per_second: 1000.0,
            timeout_secs: 5,
        })
        .unwrap();
        let base_url = Url::parse(&server.uri()).unwrap();
        let source = CustomSource::with_client("Example", base_url, rules(), client);

        let item = AudioItem {
            title: "Moby Dick".to_string(),
            source_name: "Example".to_string(),
            url: format!("{}/book/42", server.uri()),
        };

        // 500 after retries degrades to absence, not an error
        tokio::time::pause();
        assert!(source.get_details(&item).await.is_none());
    }

    #[tokio::test]
    async fn test_get_details_invalid_item_url_yields_none() {
        let server = MockServer::start().await;
        let source = source_for(&server).await;

        let item = AudioItem {
            title: "Broken".to_string(),
            source_name: "Example".to_string(),
            url: "not a url".to_string(),
        };

        assert!(source.get_details(&item).await.is_none());
    }
}
