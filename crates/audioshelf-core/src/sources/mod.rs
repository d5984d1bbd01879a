//! Source implementations.
//!
//! - `custom`: rule-driven scraper configured entirely by selectors
//! - `archive`: fixed client for the archive.org JSON API

pub mod archive;
pub mod custom;

pub use archive::ArchiveSource;
pub use custom::CustomSource;
