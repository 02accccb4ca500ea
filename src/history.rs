//! Versioned chat-optimize history with a movable cursor.

use std::sync::Arc;

use kv_store::KeyValueStore;
use unicode_segmentation::UnicodeSegmentation;

use crate::error::ForgeError;

/// Storage key holding the JSON array of recorded versions.
pub const CHAT_VERSIONS_KEY: &str = "chat_optimize_versions";
/// Maximum preview length, in user-perceived characters.
pub const PREVIEW_CHARS: usize = 60;
const PREVIEW_ELLIPSIS: &str = "...";

/// One row of the version listing, most recent first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionEntry {
    /// Zero-based position in the history.
    pub index: usize,
    /// One-based display number.
    pub number: usize,
    pub preview: String,
    pub is_latest: bool,
    pub is_current: bool,
}

impl VersionEntry {
    pub fn label(&self) -> String {
        if self.is_latest {
            format!("Version {} (latest)", self.number)
        } else {
            format!("Version {}", self.number)
        }
    }
}

/// Append-only version log persisted after every recorded change.
pub struct ChatHistory {
    versions: Vec<String>,
    cursor: Option<usize>,
    store: Arc<dyn KeyValueStore>,
}

impl ChatHistory {
    /// Loads the persisted history. Missing or corrupt data yields an empty history.
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let versions = match read_versions(store.as_ref()) {
            Ok(versions) => versions,
            Err(error) => {
                tracing::warn!(%error, "discarding stored chat history");
                Vec::new()
            }
        };
        let cursor = versions.len().checked_sub(1);

        Self {
            versions,
            cursor,
            store,
        }
    }

    pub fn versions(&self) -> &[String] {
        &self.versions
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn current(&self) -> Option<&str> {
        self.cursor
            .and_then(|index| self.versions.get(index))
            .map(String::as_str)
    }

    /// Appends `text` unless it equals the last recorded version.
    ///
    /// Returns whether a version was appended.
    pub fn record_if_changed(&mut self, text: &str) -> bool {
        if self.versions.last().is_some_and(|last| last == text) {
            return false;
        }

        self.versions.push(text.to_string());
        self.cursor = Some(self.versions.len() - 1);
        self.persist();
        true
    }

    /// Steps the cursor back one version and returns it.
    pub fn undo(&mut self) -> Result<&str, ForgeError> {
        match self.cursor {
            Some(cursor) if cursor > 0 => {
                self.cursor = Some(cursor - 1);
                Ok(&self.versions[cursor - 1])
            }
            _ => Err(ForgeError::NothingToUndo),
        }
    }

    /// Moves the cursor to `index` and returns that version.
    pub fn restore(&mut self, index: usize) -> Result<&str, ForgeError> {
        if index >= self.versions.len() {
            return Err(ForgeError::out_of_range(index, self.versions.len()));
        }

        self.cursor = Some(index);
        Ok(&self.versions[index])
    }

    /// Drops every version and the persisted copy.
    pub fn clear(&mut self) {
        self.versions.clear();
        self.cursor = None;
        if let Err(error) = self.store.remove(CHAT_VERSIONS_KEY) {
            tracing::warn!(%error, "failed to erase stored chat history");
        }
    }

    /// Listing for display: newest first, with the latest and current versions flagged.
    pub fn entries(&self) -> Vec<VersionEntry> {
        let latest = self.versions.len().checked_sub(1);
        self.versions
            .iter()
            .enumerate()
            .rev()
            .map(|(index, text)| VersionEntry {
                index,
                number: index + 1,
                preview: preview(text),
                is_latest: Some(index) == latest,
                is_current: Some(index) == self.cursor,
            })
            .collect()
    }

    fn persist(&self) {
        let serialized = match serde_json::to_string(&self.versions) {
            Ok(serialized) => serialized,
            Err(error) => {
                tracing::warn!(%error, "failed to serialize chat history");
                return;
            }
        };

        if let Err(error) = self.store.set(CHAT_VERSIONS_KEY, &serialized) {
            tracing::warn!(%error, "failed to persist chat history");
        }
    }
}

fn read_versions(store: &dyn KeyValueStore) -> Result<Vec<String>, ForgeError> {
    let corrupt = |message: String| ForgeError::PersistenceCorrupt {
        key: CHAT_VERSIONS_KEY.to_string(),
        message,
    };

    let Some(raw) = store
        .get(CHAT_VERSIONS_KEY)
        .map_err(|error| corrupt(error.to_string()))?
    else {
        return Ok(Vec::new());
    };

    serde_json::from_str(&raw).map_err(|error| corrupt(error.to_string()))
}

/// Truncates `text` to [`PREVIEW_CHARS`] graphemes, marking truncation with an ellipsis.
pub fn preview(text: &str) -> String {
    let mut graphemes = text.graphemes(true);
    let head: String = graphemes.by_ref().take(PREVIEW_CHARS).collect();
    if graphemes.next().is_some() {
        format!("{head}{PREVIEW_ELLIPSIS}")
    } else {
        head
    }
}
