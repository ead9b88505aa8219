//! Sidebar view-model for saved messages.
//!
//! The host renders the actual panel; this side produces the card list:
//! one card per bookmark in ascending index order, with a short preview
//! of the saved text and its tags. An empty store yields an empty card
//! list and the host shows its empty state.

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use crate::bookmarks::store::BookmarkStore;

/// Preview length in grapheme clusters
pub const PREVIEW_GRAPHEMES: usize = 70;

// =============================================================================
// Types
// =============================================================================

/// One sidebar card
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SidebarCard {
    pub index: usize,
    pub preview: String,
    pub tags: Vec<String>,
}

/// Full sidebar contents
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct SidebarView {
    pub cards: Vec<SidebarCard>,
}

// =============================================================================
// SidebarView
// =============================================================================

impl SidebarView {
    pub fn from_store(store: &BookmarkStore) -> Self {
        let cards = store
            .entries()
            .map(|(index, bookmark)| SidebarCard {
                index,
                preview: preview_of(&bookmark.text),
                tags: bookmark.tags.clone(),
            })
            .collect();
        Self { cards }
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

/// First [`PREVIEW_GRAPHEMES`] grapheme clusters of the saved text, with
/// the trailing ellipsis the host card always shows. Grapheme slicing
/// never splits a scalar, unlike a raw code-unit slice.
fn preview_of(text: &str) -> String {
    let mut preview: String = text.graphemes(true).take(PREVIEW_GRAPHEMES).collect();
    preview.push_str("...");
    preview
}

// =============================================================================
// Tests
// =============================================================================
