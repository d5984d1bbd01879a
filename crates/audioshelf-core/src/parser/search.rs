//! Search results parser for rule-driven sources.
//!
//! Applies the configured selectors to a search results page and emits
//! one item per container that yields both a title and a link.

use scraper::{Html, Selector};
use tracing::{debug, warn};
use url::Url;

use crate::config::SearchRules;
use crate::types::AudioItem;

/// Parse search results from a search page.
///
/// Containers missing a title, missing a link element, or whose link
/// element lacks an `href` are skipped silently. Relative hrefs are
/// resolved against `base_url`. Selector or parse problems degrade to an
/// empty list; they are never an error.
pub fn parse_search_results(
    html: &str,
    rules: &SearchRules,
    base_url: &Url,
    source_name: &str,
) -> Vec<AudioItem> {
    let (container_selector, title_selector, url_selector) = match (
        Selector::parse(&rules.item_container_selector),
        Selector::parse(&rules.title_selector),
        Selector::parse(&rules.url_selector),
    ) {
        (Ok(container), Ok(title), Ok(url)) => (container, title, url),
        _ => {
            warn!(source = source_name, "invalid search selector in rules");
            return Vec::new();
        }
    };

    let document = Html::parse_document(html);
    let mut items = Vec::new();

    for container in document.select(&container_selector) {
        let title_element = container.select(&title_selector).next();
        let url_element = container.select(&url_selector).next();

        let (Some(title_element), Some(url_element)) = (title_element, url_element) else {
            debug!(source = source_name, "container matched but title/url selector failed within it");
            continue;
        };
        let Some(href) = url_element.value().attr("href") else {
            debug!(source = source_name, "url element has no href");
            continue;
        };

        let title = title_element.text().collect::<String>().trim().to_string();
        let Ok(item_url) = base_url.join(href) else {
            debug!(source = source_name, href, "could not resolve result link");
            continue;
        };

        items.push(AudioItem {
            title,
            source_name: source_name.to_string(),
            url: item_url.to_string(),
        });
    }

    items
}
