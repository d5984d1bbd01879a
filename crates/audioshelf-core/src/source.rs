//! The contract every audio source implements.

use async_trait::async_trait;
use url::Url;

use crate::error::Result;
use crate::types::{AudioItem, Audiobook};

/// A provider of search and detail operations against one content origin.
///
/// Implementations are held as trait objects behind `Arc` so the
/// aggregator and front-ends stay oblivious to which variant they hold.
#[async_trait]
pub trait AudioSource: Send + Sync {
    /// Identifying name, used to route a detail fetch back to the source
    /// that produced an item.
    fn name(&self) -> &str;

    /// Base URL relative links are resolved against.
    fn base_url(&self) -> &Url;

    /// Search the source for a query, returning lightweight items without
    /// chapters or metadata.
    ///
    /// Rule-driven sources catch transport and parse failures internally
    /// and return an empty list; the archive source surfaces them as an
    /// error for the aggregator to isolate. Neither failure mode may
    /// escape the aggregation layer.
    async fn search(&self, query: &str) -> Result<Vec<AudioItem>>;

    /// Fetch the full details for an item previously returned by
    /// `search`, including its chapter list.
    ///
    /// Fails soft: any network or parse error, and the case of zero
    /// resolvable chapters, yields `None`.
    async fn get_details(&self, item: &AudioItem) -> Option<Audiobook>;

    /// Release any held connection resources. Idempotent.
    ///
    /// The default implementation is a no-op; reqwest pools are released
    /// on drop.
    async fn close(&self) {}
}
