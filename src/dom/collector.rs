use super::{Document, NodeData, NodeId};

/// Tags whose direct text is never translated.
pub const EXCLUDED_TAGS: &[&str] = &[
    "script", "style", "noscript", "template", "code", "pre", "kbd", "samp", "svg", "canvas",
    "input", "textarea", "select", "option",
];

/// Elements carrying this attribute opt their direct text out of translation.
pub const NO_TRANSLATE_ATTRIBUTE: &str = "data-no-translate";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedText {
    pub node: NodeId,
    pub original: String,
}

/// Ordered text nodes captured for one translation pass.
///
/// Index `i` of a translation response corresponds to `entries()[i]`.
#[derive(Debug, Clone, Default)]
pub struct TextNodeSnapshot {
    entries: Vec<CapturedText>,
    revision: u64,
}

impl TextNodeSnapshot {
    /// Depth-first capture of translatable text nodes under `root`.
    pub fn capture(document: &Document, root: NodeId) -> Self {
        let mut entries = Vec::new();
        let mut stack = vec![root];

        while let Some(node) = stack.pop() {
            match document.data(node) {
                NodeData::Text(text) => {
                    if accepts(document, node, text) {
                        entries.push(CapturedText {
                            node,
                            original: text.clone(),
                        });
                    }
                }
                NodeData::Element { .. } => {
                    stack.extend(document.children(node).iter().rev().copied());
                }
            }
        }

        Self {
            entries,
            revision: document.revision(),
        }
    }

    pub fn entries(&self) -> &[CapturedText] {
        &self.entries
    }

    /// Original strings in capture order, as sent to the translator.
    pub fn originals(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.original.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Document revision at capture time.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Whether `entry` still holds its captured text in a live tree.
    pub fn is_current(&self, document: &Document, entry: &CapturedText) -> bool {
        document.is_attached(entry.node) && document.text(entry.node) == Some(entry.original.as_str())
    }
}

fn accepts(document: &Document, node: NodeId, text: &str) -> bool {
    if text.trim().is_empty() {
        return false;
    }
    let Some(parent) = document.parent(node) else {
        return false;
    };
    let Some(tag) = document.tag(parent) else {
        return false;
    };
    if EXCLUDED_TAGS.contains(&tag) {
        return false;
    }
    !document.has_attribute(parent, NO_TRANSLATE_ATTRIBUTE)
}
