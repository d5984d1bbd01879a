//! Data types for audioshelf.
//!
//! This module contains the core data structures passed between sources,
//! the aggregator and front-ends. All types implement Serialize and
//! Deserialize for JSON compatibility with callers.

use serde::{Deserialize, Serialize};

/// A lightweight search result pointing at a work on some source.
///
/// Identity is structural: two items with the same title and url refer to
/// the same work. The `source_name` routes a later detail fetch back to
/// the source that produced the item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioItem {
    /// Display title of the work
    pub title: String,
    /// Name of the source that produced this item
    pub source_name: String,
    /// URL of the work's page on the source
    pub url: String,
}

/// A single chapter of an audiobook.
///
/// The url points directly at a playable audio resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    /// Display title of the chapter
    pub title: String,
    /// Direct URL to the chapter's audio file
    pub url: String,
}

/// A full audiobook with metadata and chapters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Audiobook {
    /// Display title of the audiobook
    pub title: String,
    /// Name of the source this audiobook came from
    pub source_name: String,
    /// URL of the audiobook's page on the source
    pub url: String,
    /// Author, if known
    pub author: Option<String>,
    /// Description, if known
    pub description: Option<String>,
    /// Cover image URL, if known
    pub cover_image_url: Option<String>,
    /// Ordered chapter list
    pub chapters: Vec<Chapter>,
}

impl Audiobook {
    /// Build an audiobook carrying over the identity fields of a search
    /// result, with no metadata and no chapters yet.
    pub fn from_item(item: &AudioItem) -> Self {
        Self {
            title: item.title.clone(),
            source_name: item.source_name.clone(),
            url: item.url.clone(),
            author: None,
            description: None,
            cover_image_url: None,
            chapters: Vec::new(),
        }
    }
}

/// A single episode of a podcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PodcastEpisode {
    /// Display title of the episode
    pub title: String,
    /// Direct URL to the episode's audio file
    pub url: String,
    /// Description, if known
    pub description: Option<String>,
    /// Publication date, if known
    pub publication_date: Option<String>,
}

/// A podcast series with metadata and episodes.
///
/// No current source populates this; it is the shape an episodic source
/// would return from its detail fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Podcast {
    /// Display title of the podcast
    pub title: String,
    /// Name of the source this podcast came from
    pub source_name: String,
    /// URL of the podcast's page on the source
    pub url: String,
    /// Author, if known
    pub author: Option<String>,
    /// Description, if known
    pub description: Option<String>,
    /// Cover image URL, if known
    pub cover_image_url: Option<String>,
    /// Ordered episode list
    pub episodes: Vec<PodcastEpisode>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audio_item_serialization_round_trip() {
        let item = AudioItem {
            title: "Moby Dick".to_string(),
            source_name: "LibriVox".to_string(),
            url: "https://archive.org/details/moby_dick".to_string(),
        };

        let json = serde_json::to_string(&item).unwrap();
        let deserialized: AudioItem = serde_json::from_str(&json).unwrap();

        assert_eq!(deserialized, item);
    }

    #[test]
    fn test_audiobook_from_item_carries_identity() {
        let item = AudioItem {
            title: "Moby Dick".to_string(),
            source_name: "LibriVox".to_string(),
            url: "https://example.com/book/42".to_string(),
        };

        let book = Audiobook::from_item(&item);

        assert_eq!(book.title, item.title);
        assert_eq!(book.source_name, item.source_name);
        assert_eq!(book.url, item.url);
        assert!(book.author.is_none());
        assert!(book.chapters.is_empty());
    }

    #[test]
    fn test_audiobook_serialization_with_chapters() {
        let book = Audiobook {
            title: "Moby Dick".to_string(),
            source_name: "LibriVox".to_string(),
            url: "https://example.com/book/42".to_string(),
            author: Some("Herman Melville".to_string()),
            description: None,
            cover_image_url: None,
            chapters: vec![Chapter {
                title: "Chapter 1".to_string(),
                url: "https://example.com/audio/1.mp3".to_string(),
            }],
        };

        let json = serde_json::to_string(&book).unwrap();
        let deserialized: Audiobook = serde_json::from_str(&json).unwrap();

        assert_eq!(deserialized.chapters.len(), 1);
        assert_eq!(deserialized.author.as_deref(), Some("Herman Melville"));
    }
}
