//! Document: arena-backed tree of element and text nodes.
//!
//! Mirrors the subset of the page the engine operates on: message
//! containers (elements carrying `data-message-author-role`) and their
//! subtrees. All traversal is pre-order, matching document order on the
//! live page. Node replacement is positional so sibling structure and
//! untouched nodes (same `NodeId`) survive a rewrite.

use crate::dom::node::{NodeData, NodeId, NodeKind, NodeSpec};
use std::collections::HashMap;

/// Attribute that marks a message container on the host page
pub const MESSAGE_ATTR: &str = "data-message-author-role";

/// Arena-backed document tree
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<NodeData>,
    root: NodeId,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document with a `body` root
    pub fn new() -> Self {
        let root_data = NodeData {
            kind: NodeKind::Element {
                tag: "body".to_string(),
                attrs: HashMap::new(),
            },
            parent: None,
            children: Vec::new(),
        };
        Self {
            nodes: vec![root_data],
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    // -------------------------------------------------------------------------
    // Construction
    // -------------------------------------------------------------------------

    fn push(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(data);
        id
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(NodeData {
            kind: NodeKind::Element {
                tag: tag.to_string(),
                attrs: HashMap::new(),
            },
            parent: None,
            children: Vec::new(),
        })
    }

    pub fn create_element_with_attr(&mut self, tag: &str, name: &str, value: &str) -> NodeId {
        let mut attrs = HashMap::new();
        attrs.insert(name.to_string(), value.to_string());
        self.push(NodeData {
            kind: NodeKind::Element {
                tag: tag.to_string(),
                attrs,
            },
            parent: None,
            children: Vec::new(),
        })
    }

    pub fn create_text(&mut self, content: &str) -> NodeId {
        self.push(NodeData {
            kind: NodeKind::Text(content.to_string()),
            parent: None,
            children: Vec::new(),
        })
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Build a subtree from a spec and append it under `parent`
    pub fn insert_spec(&mut self, parent: NodeId, spec: &NodeSpec) -> NodeId {
        let id = match spec {
            NodeSpec::Text(content) => self.create_text(content),
            NodeSpec::Element { tag, attrs, children } => {
                let el = self.create_element(tag);
                if let NodeKind::Element { attrs: el_attrs, .. } = &mut self.nodes[el.0].kind {
                    el_attrs.extend(attrs.iter().map(|(k, v)| (k.clone(), v.clone())));
                }
                for child in children {
                    self.insert_spec(el, child);
                }
                el
            }
        };
        self.append_child(parent, id);
        id
    }

    /// Serialize a subtree back into the boundary shape
    pub fn to_spec(&self, id: NodeId) -> NodeSpec {
        match &self.nodes[id.0].kind {
            NodeKind::Text(content) => NodeSpec::Text(content.clone()),
            NodeKind::Element { tag, attrs } => NodeSpec::Element {
                tag: tag.clone(),
                attrs: attrs.clone(),
                children: self.nodes[id.0]
                    .children
                    .iter()
                    .map(|&c| self.to_spec(c))
                    .collect(),
            },
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.0].kind {
            NodeKind::Element { tag, .. } => Some(tag),
            NodeKind::Text(_) => None,
        }
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        match &self.nodes[id.0].kind {
            NodeKind::Element { attrs, .. } => attrs.get(name).map(String::as_str),
            NodeKind::Text(_) => None,
        }
    }

    /// Content of a text node, `None` for elements
    pub fn text_value(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.0].kind {
            NodeKind::Text(content) => Some(content),
            NodeKind::Element { .. } => None,
        }
    }

    // -------------------------------------------------------------------------
    // Traversal
    // -------------------------------------------------------------------------

    /// Pre-order traversal of a subtree, root included (document order)
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            out.push(id);
            for &child in self.nodes[id.0].children.iter().rev() {
                stack.push(child);
            }
        }
        out
    }

    /// Text leaves of a subtree in document order (the TreeWalker analog)
    pub fn text_leaves(&self, root: NodeId) -> Vec<NodeId> {
        self.descendants(root)
            .into_iter()
            .filter(|&id| self.nodes[id.0].kind.is_text())
            .collect()
    }

    /// Concatenated text content of a subtree (rendered text)
    pub fn text_of(&self, root: NodeId) -> String {
        let mut out = String::new();
        for leaf in self.text_leaves(root) {
            if let NodeKind::Text(content) = &self.nodes[leaf.0].kind {
                out.push_str(content);
            }
        }
        out
    }

    /// Elements in document order for which `predicate(tag, attrs)` holds
    pub fn elements_matching<F>(&self, predicate: F) -> Vec<NodeId>
    where
        F: Fn(&str, &HashMap<String, String>) -> bool,
    {
        self.descendants(self.root)
            .into_iter()
            .filter(|&id| match &self.nodes[id.0].kind {
                NodeKind::Element { tag, attrs } => predicate(tag, attrs),
                NodeKind::Text(_) => false,
            })
            .collect()
    }

    /// Message containers in document order (identity = position)
    pub fn containers(&self) -> Vec<NodeId> {
        self.elements_matching(|_, attrs| attrs.contains_key(MESSAGE_ATTR))
    }

    /// Index of the container an arbitrary node sits in, if any
    pub fn container_index_of(&self, id: NodeId) -> Option<usize> {
        let mut current = Some(id);
        while let Some(node) = current {
            if self.attr(node, MESSAGE_ATTR).is_some() {
                return self.containers().iter().position(|&c| c == node);
            }
            current = self.nodes[node.0].parent;
        }
        None
    }

    // -------------------------------------------------------------------------
    // Mutation
    // -------------------------------------------------------------------------

    /// Replace `target` in place with `replacements`, preserving sibling
    /// order. The target is detached; replacement nodes must be detached
    /// on entry.
    pub fn replace_with(&mut self, target: NodeId, replacements: &[NodeId]) -> Result<(), String> {
        let parent = self.nodes[target.0]
            .parent
            .ok_or_else(|| format!("node {} has no parent", target.0))?;
        let position = self.nodes[parent.0]
            .children
            .iter()
            .position(|&c| c == target)
            .ok_or_else(|| format!("node {} missing from parent child list", target.0))?;

        self.nodes[parent.0]
            .children
            .splice(position..=position, replacements.iter().copied());
        self.nodes[target.0].parent = None;
        for &replacement in replacements {
            self.nodes[replacement.0].parent = Some(parent);
        }
        Ok(())
    }

    /// Merge adjacent text children of `parent` and drop empty ones, so an
    /// unwrap pass never leaves split or empty text nodes behind
    pub fn normalize(&mut self, parent: NodeId) {
        let children = self.nodes[parent.0].children.clone();
        let mut merged: Vec<NodeId> = Vec::with_capacity(children.len());

        for child in children {
            let content = match &self.nodes[child.0].kind {
                NodeKind::Text(content) => Some(content.clone()),
                NodeKind::Element { .. } => None,
            };
            match content {
                Some(content) => {
                    if content.is_empty() {
                        self.nodes[child.0].parent = None;
                        continue;
                    }
                    let absorbed = match merged.last() {
                        Some(&previous) => {
                            if let NodeKind::Text(prev_content) = &mut self.nodes[previous.0].kind {
                                prev_content.push_str(&content);
                                true
                            } else {
                                false
                            }
                        }
                        None => false,
                    };
                    if absorbed {
                        self.nodes[child.0].parent = None;
                    } else {
                        merged.push(child);
                    }
                }
                None => merged.push(child),
            }
        }

        self.nodes[parent.0].children = merged;
    }
}

// =============================================================================
// Tests
// =============================================================================
