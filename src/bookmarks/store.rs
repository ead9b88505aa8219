//! BookmarkStore: starred messages with free-form tags.
//!
//! A whole-mapping key-value store from message index to saved text plus
//! tags. The host owns the actual persistence (its key-value storage);
//! this side only serializes the full mapping - get-all/set-all, never a
//! partial patch. Message index is the identity, matching the page's
//! position-order enumeration (a known fragility if messages are
//! reordered upstream; kept as-is).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Storage key the host uses for the serialized mapping
pub const STORAGE_KEY: &str = "gpt-saved";

// =============================================================================
// Types
// =============================================================================

/// One saved message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Bookmark {
    pub text: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Index-keyed bookmark mapping
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookmarkStore {
    entries: BTreeMap<usize, Bookmark>,
}

// =============================================================================
// Tag normalization
// =============================================================================

/// Split a comma separated tag string into trimmed, lowercased tags,
/// dropping empties. Order is preserved.
pub fn normalize_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|tag| tag.trim().to_lowercase())
        .filter(|tag| !tag.is_empty())
        .collect()
}

// =============================================================================
// BookmarkStore
// =============================================================================

impl BookmarkStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Bookmark> {
        self.entries.get(&index)
    }

    pub fn is_saved(&self, index: usize) -> bool {
        self.entries.contains_key(&index)
    }

    /// Ascending iteration over saved entries
    pub fn entries(&self) -> impl Iterator<Item = (usize, &Bookmark)> {
        self.entries.iter().map(|(&index, bookmark)| (index, bookmark))
    }

    /// Save a message. `raw_tags` is the comma separated user input.
    pub fn insert(&mut self, index: usize, text: String, raw_tags: Option<&str>) {
        let tags = raw_tags.map(normalize_tags).unwrap_or_default();
        self.entries.insert(index, Bookmark { text, tags });
    }

    /// Star/unstar. Returns whether the message is saved afterwards.
    pub fn toggle(&mut self, index: usize, text: String, raw_tags: Option<&str>) -> bool {
        if self.entries.remove(&index).is_some() {
            false
        } else {
            self.insert(index, text, raw_tags);
            true
        }
    }

    /// Remove a bookmark; absent indices are a silent no-op
    pub fn remove(&mut self, index: usize) -> bool {
        self.entries.remove(&index).is_some()
    }

    /// Saved indices carrying `tag` (normalized compare), ascending
    pub fn indices_with_tag(&self, tag: &str) -> Vec<usize> {
        let needle = tag.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.entries
            .iter()
            .filter(|(_, bookmark)| bookmark.tags.iter().any(|t| *t == needle))
            .map(|(&index, _)| index)
            .collect()
    }

    // -------------------------------------------------------------------------
    // Whole-mapping serialization (get-all / set-all)
    // -------------------------------------------------------------------------

    /// Parse the full mapping from the host's stored JSON. Empty or
    /// missing input is an empty store, not an error.
    pub fn from_json(json: &str) -> Result<Self, String> {
        let trimmed = json.trim();
        if trimmed.is_empty() {
            return Ok(Self::default());
        }
        let entries: BTreeMap<usize, Bookmark> = serde_json::from_str(trimmed)
            .map_err(|e| format!("Failed to parse saved messages: {}", e))?;
        Ok(Self { entries })
    }

    /// Serialize the full mapping for the host to store
    pub fn to_json(&self) -> Result<String, String> {
        serde_json::to_string(&self.entries)
            .map_err(|e| format!("Failed to serialize saved messages: {}", e))
    }
}

// =============================================================================
// Tests
// =============================================================================
