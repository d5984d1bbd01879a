//! Rule-driven HTML parsers.
//!
//! Parsing is kept separate from fetching: these functions take a raw
//! HTML string plus the configured rules and never touch the network, so
//! the non-`Send` `scraper::Html` document never crosses an await point.
//! - `search`: extract search result items
//! - `details`: extract audiobook metadata and chapters

pub mod details;
pub mod search;

// Re-export main parsing functions
pub use details::parse_book_details;
pub use search::parse_search_results;
