//! The generic content tree every pipeline stage consumes and produces.

use std::collections::BTreeMap;

/// A node of the content tree: either a run of text or an element.
///
/// Each element exclusively owns its children; trees are never shared or
/// cyclic, so stages rebuild nodes instead of mutating them in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentNode {
    Text(String),
    Element(Element),
}

/// An element with a lower-cased tag name, its attributes and its children.
///
/// Attributes are kept in a [`BTreeMap`] so serialization and equality do not
/// depend on the order the parser reported them in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub attributes: BTreeMap<String, String>,
    pub children: Vec<ContentNode>,
}

impl Element {
    /// Create an element with no attributes and no children.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    /// Builder-style attribute setter.
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Builder-style children setter.
    pub fn with_children(mut self, children: Vec<ContentNode>) -> Self {
        self.children = children;
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

impl From<Element> for ContentNode {
    fn from(el: Element) -> Self {
        ContentNode::Element(el)
    }
}

impl ContentNode {
    /// Shorthand for a text node.
    pub fn text(value: impl Into<String>) -> Self {
        ContentNode::Text(value.into())
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            ContentNode::Element(el) => Some(el),
            ContentNode::Text(_) => None,
        }
    }

    /// Tag name for elements, `None` for text.
    pub fn tag(&self) -> Option<&str> {
        self.as_element().map(|el| el.tag.as_str())
    }

    /// `true` for text nodes that contain nothing but whitespace (including
    /// non-breaking spaces, which office exports use as filler).
    pub fn is_whitespace_text(&self) -> bool {
        match self {
            ContentNode::Text(value) => value.chars().all(char::is_whitespace),
            ContentNode::Element(_) => false,
        }
    }

    /// Append the concatenated text of this subtree to `out`.
    pub fn collect_text(&self, out: &mut String) {
        match self {
            ContentNode::Text(value) => out.push_str(value),
            ContentNode::Element(el) => {
                for child in &el.children {
                    child.collect_text(out);
                }
            }
        }
    }
}

/// Concatenated text content of a node sequence.
pub fn text_content(nodes: &[ContentNode]) -> String {
    let mut out = String::new();
    for node in nodes {
        node.collect_text(&mut out);
    }
    out
}

/// Visit every element in the sequence, depth-first, parents before children.
pub fn walk_elements<'a>(nodes: &'a [ContentNode], visit: &mut impl FnMut(&'a Element)) {
    for node in nodes {
        if let ContentNode::Element(el) = node {
            visit(el);
            walk_elements(&el.children, visit);
        }
    }
}
