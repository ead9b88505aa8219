//! PageEngine: the stateful aggregate behind the content script.
//!
//! Owns the mirrored document, the bookmark store and the matching mode,
//! and turns page events into effect lists. One synchronous `handle` per
//! event; a new input supersedes whatever the previous one left visible.
//!
//! Whole-word mode is engine state threaded into every matcher call as a
//! parameter - there is no global flag inside the matcher.

use wasm_bindgen::prelude::*;

use crate::bookmarks::{BookmarkStore, SidebarView};
use crate::dom::{Document, NodeSpec};
use crate::highlight::{HighlightStats, Highlighter};
use crate::page::events::{Effect, PageEvent, FLASH_MS, TAG_PREFIX};

// =============================================================================
// PageEngine
// =============================================================================

#[wasm_bindgen]
pub struct PageEngine {
    doc: Document,
    store: BookmarkStore,
    /// Whole-word is the default, as on the host page
    whole_word: bool,
    /// Last non-empty, non-tag input; re-run on mode toggle
    last_query: Option<String>,
    last_stats: Option<HighlightStats>,
}

impl Default for PageEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl PageEngine {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            doc: Document::new(),
            store: BookmarkStore::new(),
            whole_word: true,
            last_query: None,
            last_stats: None,
        }
    }

    /// Replace the mirrored messages with a fresh page snapshot (JS binding)
    #[wasm_bindgen(js_name = loadMessages)]
    pub fn js_load_messages(&mut self, specs: JsValue) -> Result<(), JsValue> {
        let specs: Vec<NodeSpec> = serde_wasm_bindgen::from_value(specs)
            .map_err(|e| JsValue::from_str(&format!("Failed to parse message specs: {}", e)))?;
        self.load_messages(&specs);
        Ok(())
    }

    /// Hydrate bookmarks from host storage (JS binding)
    #[wasm_bindgen(js_name = loadBookmarks)]
    pub fn js_load_bookmarks(&mut self, json: &str) -> Result<(), JsValue> {
        self.load_bookmarks(json).map_err(|e| JsValue::from_str(&e))
    }

    /// Serialize the full bookmark mapping for host storage (JS binding)
    #[wasm_bindgen(js_name = dumpBookmarks)]
    pub fn js_dump_bookmarks(&self) -> Result<String, JsValue> {
        self.store.to_json().map_err(|e| JsValue::from_str(&e))
    }

    /// Handle one page event and return the effect list (JS binding)
    #[wasm_bindgen(js_name = handleEvent)]
    pub fn js_handle_event(&mut self, event: JsValue) -> Result<JsValue, JsValue> {
        let event: PageEvent = serde_wasm_bindgen::from_value(event)
            .map_err(|e| JsValue::from_str(&format!("Failed to parse event: {}", e)))?;
        let effects = self.handle(event).map_err(|e| JsValue::from_str(&e))?;
        match serde_wasm_bindgen::to_value(&effects) {
            Ok(value) => Ok(value),
            Err(e) => {
                web_sys::console::error_1(
                    &format!("[PageEngine] Serialization failed: {:?}", e).into(),
                );
                Err(JsValue::from_str("Failed to serialize effects"))
            }
        }
    }

    /// Current subtree of container `index` for host re-rendering (JS binding)
    #[wasm_bindgen(js_name = containerSpec)]
    pub fn js_container_spec(&self, index: usize) -> JsValue {
        match self.container_spec(index) {
            Some(spec) => serde_wasm_bindgen::to_value(&spec).unwrap_or(JsValue::NULL),
            None => JsValue::NULL,
        }
    }

    #[wasm_bindgen(js_name = containerCount)]
    pub fn container_count(&self) -> usize {
        self.doc.containers().len()
    }

    #[wasm_bindgen(js_name = wholeWord)]
    pub fn whole_word(&self) -> bool {
        self.whole_word
    }

    /// Stats of the most recent highlight pass (JS binding)
    #[wasm_bindgen(js_name = lastStats)]
    pub fn js_last_stats(&self) -> JsValue {
        match &self.last_stats {
            Some(stats) => serde_wasm_bindgen::to_value(stats).unwrap_or(JsValue::NULL),
            None => JsValue::NULL,
        }
    }
}

impl PageEngine {
    /// Replace the mirrored messages with a fresh page snapshot
    pub fn load_messages(&mut self, specs: &[NodeSpec]) {
        let mut doc = Document::new();
        for spec in specs {
            doc.insert_spec(doc.root(), spec);
        }
        self.doc = doc;
    }

    /// Hydrate bookmarks from the host's stored JSON
    pub fn load_bookmarks(&mut self, json: &str) -> Result<(), String> {
        self.store = BookmarkStore::from_json(json)?;
        Ok(())
    }

    pub fn doc(&self) -> &Document {
        &self.doc
    }

    pub fn store(&self) -> &BookmarkStore {
        &self.store
    }

    pub fn container_spec(&self, index: usize) -> Option<NodeSpec> {
        self.doc
            .containers()
            .get(index)
            .map(|&container| self.doc.to_spec(container))
    }

    /// Handle one page event
    pub fn handle(&mut self, event: PageEvent) -> Result<Vec<Effect>, String> {
        match event {
            PageEvent::DocumentReady => Ok(self.on_document_ready()),
            PageEvent::InputChanged { query } => self.on_input(&query),
            PageEvent::ModeToggled => self.on_mode_toggled(),
            PageEvent::StarClicked { index, tags } => self.on_star(index, tags.as_deref()),
            PageEvent::CardClicked { index } => Ok(self.on_card_clicked(index)),
            PageEvent::CardDeleted { index } => self.on_card_deleted(index),
        }
    }

    // -------------------------------------------------------------------------
    // Event handlers
    // -------------------------------------------------------------------------

    fn on_document_ready(&mut self) -> Vec<Effect> {
        let mut effects: Vec<Effect> = (0..self.doc.containers().len())
            .map(|index| Effect::SetStar {
                index,
                saved: self.store.is_saved(index),
            })
            .collect();
        effects.push(self.render_sidebar());
        effects
    }

    fn on_input(&mut self, raw: &str) -> Result<Vec<Effect>, String> {
        let trimmed = raw.trim();

        if let Some(tag) = trimmed.strip_prefix(TAG_PREFIX) {
            // tag search and text search are mutually exclusive: markers
            // are cleared, none are created
            self.last_query = None;
            let mut effects = self.clear_page()?;
            let container_count = self.doc.containers().len();
            for index in self.store.indices_with_tag(tag) {
                if index < container_count {
                    effects.push(Effect::Outline { index });
                    effects.push(Effect::ScrollToContainer { index });
                }
            }
            return Ok(effects);
        }

        if trimmed.is_empty() {
            self.last_query = None;
            return self.clear_page();
        }

        let query = trimmed.to_string();
        self.last_query = Some(query.clone());
        let mut effects = vec![Effect::ClearOutlines];
        effects.extend(self.run_highlight(&query)?);
        Ok(effects)
    }

    fn on_mode_toggled(&mut self) -> Result<Vec<Effect>, String> {
        self.whole_word = !self.whole_word;
        match self.last_query.clone() {
            Some(query) => self.run_highlight(&query),
            None => Ok(Vec::new()),
        }
    }

    fn on_star(&mut self, index: usize, raw_tags: Option<&str>) -> Result<Vec<Effect>, String> {
        let container = match self.doc.containers().get(index) {
            Some(&container) => container,
            None => return Ok(Vec::new()),
        };
        let text = self.doc.text_of(container);
        let saved = self.store.toggle(index, text, raw_tags);

        Ok(vec![
            Effect::SetStar { index, saved },
            Effect::PersistBookmarks {
                json: self.store.to_json()?,
            },
            self.render_sidebar(),
        ])
    }

    fn on_card_clicked(&self, index: usize) -> Vec<Effect> {
        if index >= self.doc.containers().len() {
            return Vec::new();
        }
        vec![
            Effect::ScrollToContainer { index },
            Effect::FlashOutline {
                index,
                duration_ms: FLASH_MS,
            },
        ]
    }

    fn on_card_deleted(&mut self, index: usize) -> Result<Vec<Effect>, String> {
        self.store.remove(index);
        Ok(vec![
            Effect::SetStar {
                index,
                saved: false,
            },
            Effect::PersistBookmarks {
                json: self.store.to_json()?,
            },
            self.render_sidebar(),
        ])
    }

    // -------------------------------------------------------------------------
    // Helpers
    // -------------------------------------------------------------------------

    /// Unwrap all markers and drop outlines; every input starts clean
    fn clear_page(&mut self) -> Result<Vec<Effect>, String> {
        let outcome = Highlighter::highlight(&mut self.doc, "", self.whole_word)?;
        self.last_stats = Some(outcome.stats);
        let mut effects = vec![Effect::ClearOutlines];
        effects.extend(
            outcome
                .touched_containers
                .into_iter()
                .map(|index| Effect::SyncContainer { index }),
        );
        Ok(effects)
    }

    fn run_highlight(&mut self, query: &str) -> Result<Vec<Effect>, String> {
        let outcome = Highlighter::highlight(&mut self.doc, query, self.whole_word)?;
        let mut effects: Vec<Effect> = outcome
            .touched_containers
            .iter()
            .map(|&index| Effect::SyncContainer { index })
            .collect();
        if outcome.first_marker.is_some() {
            effects.push(Effect::ScrollToFirstMarker);
        }
        self.last_stats = Some(outcome.stats);
        Ok(effects)
    }

    fn render_sidebar(&self) -> Effect {
        Effect::RenderSidebar {
            view: SidebarView::from_store(&self.store),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
