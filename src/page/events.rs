//! Events in, effects out.
//!
//! The implicit listener wiring of a content script becomes explicit
//! message passing: the host forwards page events as [`PageEvent`]
//! values and applies the returned [`Effect`] list to the live page.
//! The core never touches the real DOM.

use serde::{Deserialize, Serialize};

use crate::bookmarks::SidebarView;

/// Duration of the one-shot outline flash after a sidebar card click
pub const FLASH_MS: u64 = 1500;

/// Prefix that routes an input to tag search instead of the matcher
pub const TAG_PREFIX: &str = "tag:";

// =============================================================================
// PageEvent
// =============================================================================

/// A notification from the host page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PageEvent {
    /// One-time setup signal once message containers exist
    DocumentReady,
    /// Search box content changed; empty is a valid "clear" input
    InputChanged { query: String },
    /// Whole-word / substring toggle flipped
    ModeToggled,
    /// Star on a container clicked. `tags` carries the raw comma
    /// separated prompt input when starring; ignored when unstarring.
    StarClicked {
        index: usize,
        #[serde(default)]
        tags: Option<String>,
    },
    /// Sidebar card clicked
    CardClicked { index: usize },
    /// Sidebar card delete clicked
    CardDeleted { index: usize },
}

// =============================================================================
// Effect
// =============================================================================

/// An instruction for the host to apply to the live page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Effect {
    /// Re-render container `index` from `containerSpec(index)` - its
    /// subtree changed (markers added or unwrapped)
    SyncContainer { index: usize },
    /// Smooth, centered scroll to the first `mark.gpt-highlight`
    ScrollToFirstMarker,
    /// Smooth, centered scroll to container `index`
    ScrollToContainer { index: usize },
    /// Outline container `index`; persists until the next input event
    Outline { index: usize },
    /// Drop every container outline
    ClearOutlines,
    /// Outline container `index`, then reset after `duration_ms`
    FlashOutline { index: usize, duration_ms: u64 },
    /// Update the star glyph on container `index`
    SetStar { index: usize, saved: bool },
    /// Write the full bookmark mapping to host storage (set-all)
    PersistBookmarks { json: String },
    /// Replace the sidebar contents
    RenderSidebar { view: SidebarView },
}

// =============================================================================
// Tests
// =============================================================================
