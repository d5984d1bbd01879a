//! Audioshelf core library.
//!
//! Locates audiobook content across heterogeneous web sources and hands
//! resolved chapter URLs to a playback front-end.
//!
//! # Features
//! - A uniform [`AudioSource`] contract over all source variants
//! - Rule-driven scraping of arbitrary HTML sites, configured in YAML
//! - A fixed client for the archive.org audiobook collection
//! - Concurrent search fan-out with per-source fault isolation and one
//!   overall deadline
//! - A detail-merge stage combining scraped data with optional external
//!   metadata enrichment

pub mod aggregator;
pub mod client;
pub mod config;
pub mod enrich;
pub mod error;
pub mod metadata;
pub mod parser;
pub mod registry;
pub mod source;
pub mod sources;
pub mod types;

// Re-export main types for convenience
pub use aggregator::{search_all, DEFAULT_SEARCH_TIMEOUT};
pub use client::{ClientConfig, RateLimiter, SourceClient};
pub use config::{load_sources_from_yaml, DetailRules, ScrapingRules, SearchRules, SourceConfig};
pub use enrich::fetch_details;
pub use error::{Result, SourceError};
pub use metadata::{GoogleBooksClient, VolumeInfo};
pub use registry::{build_source, SourceRegistry};
pub use source::AudioSource;
pub use sources::{ArchiveSource, CustomSource};
pub use types::{AudioItem, Audiobook, Chapter, Podcast, PodcastEpisode};
