//! Detail-merge stage: a source's detail fetch combined with optional
//! third-party metadata enrichment.

use std::time::Duration;

use tracing::warn;

use crate::error::{Result, SourceError};
use crate::metadata::{GoogleBooksClient, VolumeInfo};
use crate::registry::SourceRegistry;
use crate::types::{AudioItem, Audiobook};

/// Budget for the external metadata lookup, independent of and shorter
/// than the primary detail fetch.
pub const METADATA_TIMEOUT: Duration = Duration::from_secs(5);

/// Fetch full details for a selected item, enriched with external
/// metadata when a client is supplied.
///
/// The source's detail fetch and the metadata lookup run concurrently;
/// a failure or timeout of the lookup never delays or fails the detail
/// fetch. Chapters are the non-negotiable minimum: when the source
/// yields nothing, the whole stage yields `Ok(None)` and any metadata
/// that did arrive is discarded.
///
/// # Errors
/// `SourceError::UnknownSource` when the item's source is not in the
/// registry. That indicates a caller/registry desynchronization bug, so
/// it is surfaced rather than treated as a soft miss.
pub async fn fetch_details(
    registry: &SourceRegistry,
    item: &AudioItem,
    metadata: Option<&GoogleBooksClient>,
) -> Result<Option<Audiobook>> {
    let source = registry
        .get(&item.source_name)
        .ok_or_else(|| SourceError::UnknownSource(item.source_name.clone()))?;

    let lookup = async {
        let client = metadata?;
        match tokio::time::timeout(METADATA_TIMEOUT, client.fetch(&item.title, None)).await {
            Ok(volume) => volume,
            Err(_) => {
                warn!(title = %item.title, "metadata lookup timed out");
                None
            }
        }
    };

    let (book, volume) = tokio::join!(source.get_details(item), lookup);

    let Some(mut book) = book else {
        return Ok(None);
    };
    if let Some(volume) = volume {
        apply_enrichment(&mut book, volume);
    }
    Ok(Some(book))
}

/// Merge external metadata into a scraped audiobook.
///
/// External values win per field when present; scraped values survive
/// otherwise.
fn apply_enrichment(book: &mut Audiobook, volume: VolumeInfo) {
    if !volume.authors.is_empty() {
        book.author = Some(volume.authors.join(", "));
    }
    if let Some(description) = volume.description {
        book.description = Some(description);
    }
    if let Some(thumbnail) = volume.image_links.and_then(|links| links.thumbnail) {
        book.cover_image_url = Some(thumbnail);
    }
}
