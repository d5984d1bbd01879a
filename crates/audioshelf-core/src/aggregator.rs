//! Concurrent search fan-out across all registered sources.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::{Result, SourceError};
use crate::source::AudioSource;
use crate::types::AudioItem;

/// Wall-clock budget for one whole fan-out, shared by all sources.
pub const DEFAULT_SEARCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Search every source concurrently and flatten the results.
///
/// One deadline covers the entire fan-out. Sources that complete within
/// it contribute their results; a source that fails, panics or is still
/// outstanding at the deadline is logged and contributes nothing, and is
/// aborted rather than awaited again. The output is grouped by source in
/// registration order with each source's internal order preserved, so it
/// is deterministic regardless of completion timing.
///
/// # Errors
/// `SourceError::NoSources` when `sources` is empty. All sources merely
/// returning nothing is `Ok` with an empty list, which is a different
/// situation for the caller.
pub async fn search_all(
    sources: &[Arc<dyn AudioSource>],
    query: &str,
    budget: Duration,
) -> Result<Vec<AudioItem>> {
    if sources.is_empty() {
        return Err(SourceError::NoSources);
    }

    let deadline = tokio::time::Instant::now() + budget;

    let mut handles = Vec::with_capacity(sources.len());
    for source in sources {
        let source = Arc::clone(source);
        let name = source.name().to_string();
        let query = query.to_string();
        let handle = tokio::spawn(async move { source.search(&query).await });
        handles.push((name, handle));
    }

    let mut items = Vec::new();
    for (name, handle) in handles {
        let abort = handle.abort_handle();
        match tokio::time::timeout_at(deadline, handle).await {
            Ok(Ok(Ok(found))) => {
                debug!(source = %name, count = found.len(), "source finished searching");
                items.extend(found);
            }
            Ok(Ok(Err(err))) => {
                warn!(source = %name, %err, "source failed during search");
            }
            Ok(Err(err)) => {
                warn!(source = %name, %err, "search task did not run to completion");
            }
            Err(_) => {
                // Deadline reached while this source was still out.
                // Capture nothing from it and stop driving it.
                abort.abort();
                warn!(source = %name, "source did not respond within the search budget");
            }
        }
    }

    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use url::Url;

    use crate::types::Audiobook;

    enum Behavior {
        Items(Vec<&'static str>),
        DelayedItems(Duration, Vec<&'static str>),
        Fail,
        Hang,
    }

    struct StubSource {
        name: String,
        base_url: Url,
        behavior: Behavior,
    }

    impl StubSource {
        fn new(name: &str, behavior: Behavior) -> Arc<dyn AudioSource> {
            Arc::new(Self {
                name: name.to_string(),
                base_url: Url::parse("https://stub.example.com").unwrap(),
                behavior,
            })
        }

        fn items(&self, titles: &[&'static str]) -> Vec<AudioItem> {
            titles
                .iter()
                .map(|title| AudioItem {
                    title: title.to_string(),
                    source_name: self.name.clone(),
                    url: format!("https://stub.example.com/{title}"),
                })
                .collect()
        }
    }

    #[async_trait]
    impl AudioSource for StubSource {
        fn name(&self) -> &str {
            &self.name
        }

        fn base_url(&self) -> &Url {
            &self.base_url
        }

        async fn search(&self, _query: &str) -> Result<Vec<AudioItem>> {
            match &self.behavior {
                Behavior::Items(titles) => Ok(self.items(titles)),
                Behavior::DelayedItems(delay, titles) => {
                    tokio::time::sleep(*delay).await;
                    Ok(self.items(titles))
                }
                Behavior::Fail => Err(SourceError::Parse("stub failure".to_string())),
                Behavior::Hang => {
                    tokio::time::sleep(Duration::from_secs(86400)).await;
                    Ok(Vec::new())
                }
            }
        }

        async fn get_details(&self, _item: &AudioItem) -> Option<Audiobook> {
            None
        }
    }

    #[tokio::test]
    async fn test_no_sources_is_a_distinct_error() {
        let result = search_all(&[], "moby", DEFAULT_SEARCH_TIMEOUT).await;
        assert!(matches!(result, Err(SourceError::NoSources)));
    }

    #[tokio::test]
    async fn test_all_sources_empty_is_ok() {
        let sources = vec![StubSource::new("A", Behavior::Items(vec![]))];
        let items = search_all(&sources, "moby", DEFAULT_SEARCH_TIMEOUT)
            .await
            .unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_results_grouped_in_registration_order() {
        // The first source is slower than the second; output order must
        // still follow registration order, not completion order.
        let sources = vec![
            StubSource::new(
                "Slow",
                Behavior::DelayedItems(Duration::from_secs(2), vec!["s1", "s2"]),
            ),
            StubSource::new("Fast", Behavior::Items(vec!["f1"])),
        ];

        let items = search_all(&sources, "moby", DEFAULT_SEARCH_TIMEOUT)
            .await
            .unwrap();

        let titles: Vec<&str> = items.iter().map(|item| item.title.as_str()).collect();
        assert_eq!(titles, vec!["s1", "s2", "f1"]);
    }

    #[tokio::test]
    async fn test_failing_source_is_isolated() {
        let sources = vec![
            StubSource::new("A", Behavior::Items(vec!["a1"])),
            StubSource::new("Broken", Behavior::Fail),
            StubSource::new("C", Behavior::Items(vec!["c1"])),
        ];

        let items = search_all(&sources, "moby", DEFAULT_SEARCH_TIMEOUT)
            .await
            .unwrap();

        let titles: Vec<&str> = items.iter().map(|item| item.title.as_str()).collect();
        assert_eq!(titles, vec!["a1", "c1"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_source_does_not_block_the_rest() {
        let sources = vec![
            StubSource::new("Hung", Behavior::Hang),
            StubSource::new("B", Behavior::Items(vec!["b1"])),
        ];

        let start = tokio::time::Instant::now();
        let items = search_all(&sources, "moby", Duration::from_secs(10))
            .await
            .unwrap();
        let elapsed = start.elapsed();

        let titles: Vec<&str> = items.iter().map(|item| item.title.as_str()).collect();
        assert_eq!(titles, vec!["b1"]);
        // The whole fan-out is bounded by one budget, not one per source
        assert!(elapsed <= Duration::from_secs(11));
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_source_keeps_already_settled_results() {
        let sources = vec![
            StubSource::new(
                "InTime",
                Behavior::DelayedItems(Duration::from_secs(5), vec!["ok"]),
            ),
            StubSource::new("Hung", Behavior::Hang),
        ];

        let items = search_all(&sources, "moby", Duration::from_secs(10))
            .await
            .unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "ok");
    }
}
