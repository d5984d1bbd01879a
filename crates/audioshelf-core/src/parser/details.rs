//! Detail page parser for rule-driven sources.

use scraper::{Html, Selector};
use tracing::{debug, warn};

use crate::config::DetailRules;
use crate::types::{AudioItem, Audiobook, Chapter};

/// Parse an audiobook's detail page.
///
/// Metadata selectors are optional; an absent selector or a selector that
/// matches nothing yields a `None` field, never a failure. Chapters are
/// numbered by their container's position among ALL chapter containers,
/// so a container without a resolvable audio source leaves a gap in the
/// numbering rather than shifting later chapters down.
pub fn parse_book_details(html: &str, rules: &DetailRules, item: &AudioItem) -> Audiobook {
    let document = Html::parse_document(html);

    let mut book = Audiobook::from_item(item);
    book.author = select_text(&document, rules.author_selector.as_deref());
    book.description = select_text(&document, rules.description_selector.as_deref());
    book.cover_image_url = select_attr(&document, rules.cover_image_url_selector.as_deref(), "src");
    book.chapters = parse_chapters(&document, rules, &item.source_name);
    book
}

fn parse_chapters(document: &Html, rules: &DetailRules, source_name: &str) -> Vec<Chapter> {
    let (container_selector, url_selector) = match (
        Selector::parse(&rules.chapter_container_selector),
        Selector::parse(&rules.chapter_url_selector),
    ) {
        (Ok(container), Ok(url)) => (container, url),
        _ => {
            warn!(source = source_name, "invalid chapter selector in rules");
            return Vec::new();
        }
    };

    let mut chapters = Vec::new();
    // 1-based over all containers; skipped containers keep their index
    for (i, container) in document.select(&container_selector).enumerate() {
        let Some(url_element) = container.select(&url_selector).next() else {
            debug!(source = source_name, index = i + 1, "chapter container without url element");
            continue;
        };
        let Some(src) = url_element.value().attr("src") else {
            continue;
        };

        chapters.push(Chapter {
            title: format!("Chapter {}", i + 1),
            url: src.to_string(),
        });
    }

    chapters
}

/// Select the trimmed text of the first match, if a selector is given.
fn select_text(document: &Html, selector: Option<&str>) -> Option<String> {
    let selector = Selector::parse(selector?).ok()?;
    let element = document.select(&selector).next()?;
    let text = element.text().collect::<String>().trim().to_string();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Select an attribute of the first match, if a selector is given.
fn select_attr(document: &Html, selector: Option<&str>, attr: &str) -> Option<String> {
    let selector = Selector::parse(selector?).ok()?;
    let element = document.select(&selector).next()?;
    element.value().attr(attr).map(str::to_string)
}
