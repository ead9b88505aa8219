//! Node primitives for the synthetic document tree.
//!
//! The hosting content script mirrors message subtrees into an explicit
//! arena of nodes so the matcher can run (and be unit-tested) without a
//! live render tree. Ids are indices into the document arena, never
//! pointers; detached nodes simply become unreachable.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// =============================================================================
// Types
// =============================================================================

/// Handle to a node in a [`Document`](crate::dom::Document) arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Raw arena index
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Element or text leaf (tagged union over the two node shapes the
/// matcher cares about; comments, CDATA etc. never cross the boundary)
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Element {
        tag: String,
        attrs: HashMap<String, String>,
    },
    Text(String),
}

impl NodeKind {
    pub fn is_text(&self) -> bool {
        matches!(self, NodeKind::Text(_))
    }

    pub fn is_element(&self) -> bool {
        matches!(self, NodeKind::Element { .. })
    }
}

/// One slot in the document arena
#[derive(Debug, Clone)]
pub struct NodeData {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

// =============================================================================
// NodeSpec - serde boundary shape
// =============================================================================

/// JSON-friendly tree shape used to sync subtrees across the wasm
/// boundary. A bare string is a text node; an object is an element:
///
/// ```json
/// { "tag": "p", "children": ["I like ", { "tag": "b", "children": ["cats"] }] }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum NodeSpec {
    Text(String),
    Element {
        tag: String,
        #[serde(default)]
        attrs: HashMap<String, String>,
        #[serde(default)]
        children: Vec<NodeSpec>,
    },
}

impl NodeSpec {
    /// Convenience constructor for an element with no attributes
    pub fn element(tag: &str, children: Vec<NodeSpec>) -> Self {
        NodeSpec::Element {
            tag: tag.to_string(),
            attrs: HashMap::new(),
            children,
        }
    }

    /// Convenience constructor for a text node
    pub fn text(content: &str) -> Self {
        NodeSpec::Text(content.to_string())
    }
}

// =============================================================================
// Tests
// =============================================================================
