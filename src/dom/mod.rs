//! Rendered page model.
//!
//! A small arena-backed element/text tree standing in for the rendered page
//! body. Every mutation bumps the document revision so that work captured
//! against an earlier tree can tell the tree has changed underneath it.

mod collector;

pub use collector::{CapturedText, TextNodeSnapshot, EXCLUDED_TAGS, NO_TRANSLATE_ATTRIBUTE};

use std::collections::BTreeMap;

/// Handle to a node of one [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    Element {
        tag: String,
        attributes: BTreeMap<String, String>,
    },
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    attached: bool,
}

/// The rendered page, rooted at a `body` element.
///
/// Node handles are only meaningful for the document that created them;
/// passing a foreign handle panics.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    body: NodeId,
    revision: u64,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        let body = Node {
            data: NodeData::Element {
                tag: "body".to_string(),
                attributes: BTreeMap::new(),
            },
            parent: None,
            children: Vec::new(),
            attached: true,
        };
        Self {
            nodes: vec![body],
            body: NodeId(0),
            revision: 0,
        }
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    /// Incremented on every mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Append an element (tag names are stored lower-case).
    pub fn append_element(&mut self, parent: NodeId, tag: &str) -> NodeId {
        self.push(
            parent,
            NodeData::Element {
                tag: tag.to_ascii_lowercase(),
                attributes: BTreeMap::new(),
            },
        )
    }

    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        self.push(parent, NodeData::Text(text.to_string()))
    }

    /// Set an attribute on an element. No-op on text nodes.
    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        if let NodeData::Element { attributes, .. } = &mut self.nodes[node.0].data {
            attributes.insert(name.to_string(), value.to_string());
            self.revision += 1;
        }
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        match &self.nodes[node.0].data {
            NodeData::Element { attributes, .. } => attributes.get(name).map(String::as_str),
            NodeData::Text(_) => None,
        }
    }

    pub fn has_attribute(&self, node: NodeId, name: &str) -> bool {
        self.attribute(node, name).is_some()
    }

    pub fn data(&self, node: NodeId) -> &NodeData {
        &self.nodes[node.0].data
    }

    /// Tag name of an element, `None` for text nodes.
    pub fn tag(&self, node: NodeId) -> Option<&str> {
        match &self.nodes[node.0].data {
            NodeData::Element { tag, .. } => Some(tag),
            NodeData::Text(_) => None,
        }
    }

    /// Content of a text node, `None` for elements.
    pub fn text(&self, node: NodeId) -> Option<&str> {
        match &self.nodes[node.0].data {
            NodeData::Text(text) => Some(text),
            NodeData::Element { .. } => None,
        }
    }

    /// Overwrite a text node's content. Returns false for elements.
    pub fn set_text(&mut self, node: NodeId, text: &str) -> bool {
        match &mut self.nodes[node.0].data {
            NodeData::Text(current) => {
                *current = text.to_string();
                self.revision += 1;
                true
            }
            NodeData::Element { .. } => false,
        }
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.0].children
    }

    /// Whether the node is still part of the tree under `body`.
    pub fn is_attached(&self, node: NodeId) -> bool {
        self.nodes.get(node.0).is_some_and(|n| n.attached)
    }

    /// Detach a node and its subtree. Detached handles stay valid but are
    /// no longer reachable from `body`.
    pub fn remove(&mut self, node: NodeId) {
        if node == self.body {
            return;
        }
        if let Some(parent) = self.nodes[node.0].parent.take() {
            self.nodes[parent.0].children.retain(|child| *child != node);
        }

        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            let entry = &mut self.nodes[current.0];
            entry.attached = false;
            stack.extend(entry.children.iter().copied());
        }
        self.revision += 1;
    }

    /// Detach every child of `node` (a re-render of that subtree).
    pub fn clear_children(&mut self, node: NodeId) {
        let children = self.nodes[node.0].children.clone();
        for child in children {
            self.remove(child);
        }
    }

    /// Concatenated text of a subtree, in document order.
    pub fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            let entry = &self.nodes[current.0];
            if let NodeData::Text(text) = &entry.data {
                out.push_str(text);
            }
            stack.extend(entry.children.iter().rev().copied());
        }
        out
    }

    fn push(&mut self, parent: NodeId, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        let attached = self.nodes[parent.0].attached;
        self.nodes.push(Node {
            data,
            parent: Some(parent),
            children: Vec::new(),
            attached,
        });
        self.nodes[parent.0].children.push(id);
        self.revision += 1;
        id
    }
}
