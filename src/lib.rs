//! MarkCore: Chat-page Search + Bookmark Engine
//!
//! A Rust/WASM core for the chat-page augmentation content script:
//! in-page search with highlight markers, per-message starring with
//! free-form tags, and a sidebar of saved messages.
//!
//! # Architecture
//!
//! ## Document model
//! - `dom/node.rs` - Node primitives: arena ids, element/text union,
//!   `NodeSpec` boundary shape
//! - `dom/document.rs` - `Document`: arena tree, traversal, in-place
//!   replacement, normalize
//!
//! ## Search
//! - `highlight/pattern.rs` - `SearchPattern`: escaped literal matching,
//!   case-insensitive, optional whole-word boundaries
//! - `highlight/highlighter.rs` - `Highlighter`: clear-then-wrap pass
//!   over message containers, scroll-to-first outcome
//!
//! ## Bookmarks
//! - `bookmarks/store.rs` - `BookmarkStore`: index-keyed saved messages,
//!   tag search, whole-mapping JSON for host storage
//! - `bookmarks/sidebar.rs` - `SidebarView`: card list the host renders
//!
//! ## Page engine
//! - `page/events.rs` - `PageEvent` in, `Effect` out
//! - `page/engine.rs` - `PageEngine`: event dispatch, mode state, the
//!   `tag:` routing contract
//!
//! # Usage (WASM)
//! ```javascript,ignore
//! import init, { PageEngine } from 'markcore';
//!
//! await init();
//!
//! const engine = new PageEngine();
//! engine.loadMessages(snapshotMessages());
//! engine.loadBookmarks(localStorage.getItem('gpt-saved') || '');
//!
//! searchBox.addEventListener('input', () => {
//!   const effects = engine.handleEvent({
//!     type: 'input_changed',
//!     query: searchBox.value,
//!   });
//!   applyEffects(effects); // scrolls, outlines, container syncs
//! });
//! ```

pub mod dom;
pub mod highlight;
pub mod bookmarks;
pub mod page;

// Public exports
pub use dom::*;
pub use highlight::*;
pub use bookmarks::*;
pub use page::*;

use wasm_bindgen::prelude::*;

// When the `wee_alloc` feature is enabled, use `wee_alloc` as the global
// allocator for smaller WASM bundle size.
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

/// Initialize panic hook and announce the core in the browser console
#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    web_sys::console::log_1(&format!("markcore v{} loaded", env!("CARGO_PKG_VERSION")).into());
}

/// Get version information
#[wasm_bindgen]
pub fn version() -> String {
    format!("markcore v{}", env!("CARGO_PKG_VERSION"))
}
