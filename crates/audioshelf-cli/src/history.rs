//! Playback history persistence.
//!
//! The history is an explicit value passed through the app: loaded once
//! at startup, saved after every mutation. A missing or corrupt file
//! loads as the empty default.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Default history file name, resolved in the working directory.
pub const HISTORY_FILE: &str = ".audioshelf_history.json";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaybackHistory {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_selected: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_audiobook: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_chapter_index: Option<usize>,
}

impl PlaybackHistory {
    /// Load history from a file, falling back to the default on any
    /// problem.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(text) => serde_json::from_str(&text).unwrap_or_else(|err| {
                debug!(path = %path.display(), %err, "history file unreadable, starting fresh");
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Save history to a file. Failures are logged, not fatal; losing
    /// history never interrupts playback.
    pub fn save(&self, path: &Path) {
        let text = match serde_json::to_string_pretty(self) {
            Ok(text) => text,
            Err(err) => {
                warn!(%err, "could not serialize history");
                return;
            }
        };
        if let Err(err) = std::fs::write(path, text) {
            warn!(path = %path.display(), %err, "could not save history");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_file_is_default() {
        let history = PlaybackHistory::load(Path::new("/nonexistent/history.json"));
        assert_eq!(history, PlaybackHistory::default());
    }

    #[test]
    fn test_load_corrupt_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        std::fs::write(&path, "{ not json").unwrap();

        let history = PlaybackHistory::load(&path);
        assert_eq!(history, PlaybackHistory::default());
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");

        let history = PlaybackHistory {
            last_search: Some("moby dick".to_string()),
            last_selected: Some("Moby Dick".to_string()),
            last_audiobook: Some("Moby Dick".to_string()),
            last_chapter_index: Some(3),
        };
        history.save(&path);

        assert_eq!(PlaybackHistory::load(&path), history);
    }
}
