//! Markup parsing and serialization.
//!
//! Parsing is delegated to `scraper` (html5ever underneath), which recovers
//! from malformed input the way browsers do. The resulting `ego_tree` is
//! converted into owned [`ContentNode`]s so later stages can rebuild trees
//! freely.

use std::sync::LazyLock;

use ego_tree::NodeRef;
use regex::Regex;
use scraper::{Html, node::Node};

use crate::error::{PasteError, Result};
use crate::node::{ContentNode, Element};

/// Default upper bound on the size of a markup payload (4 MiB).
pub const DEFAULT_MAX_MARKUP_BYTES: usize = 4 * 1024 * 1024;

/// Deepest element nesting accepted from the parser. Every later stage walks
/// the tree recursively, so this bounds their stack use.
pub const MAX_NESTING_DEPTH: usize = 512;

/// Upper bound on open tags counted in the raw markup before parsing.
/// Deeply nested input makes the tree builder quadratic, so it is refused
/// before it reaches the parser.
const MAX_OPEN_TAGS: usize = 4096;

/// Elements the tree builder closes implicitly; they cannot nest without an
/// intermediate counted element.
const SELF_CLOSING_FLOW: &[&str] = &["p", "li", "td", "th", "tr", "dt", "dd", "option"];

/// Captures: (1) `/` for end tags, (2) tag name
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<(/?)([A-Za-z][A-Za-z0-9:_-]*)").expect("TAG_RE: hardcoded regex is valid")
});

/// HTML5 void elements that must not have a closing tag.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

pub fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

/// Turns a raw markup string into a content tree.
///
/// Implementations must tolerate malformed input and must not return trees
/// nested deeper than [`MAX_NESTING_DEPTH`]. Returning an error is a total
/// failure: the paste falls back to its plain-text representation.
pub trait MarkupParser: Send + Sync {
    fn parse(&self, markup: &str) -> Result<Vec<ContentNode>>;
}

/// [`MarkupParser`] backed by `scraper`'s HTML fragment parser.
///
/// # Example
///
/// ```
/// use paste_sanitizer::{HtmlMarkup, MarkupParser};
///
/// let nodes = HtmlMarkup::default().parse("<p>Hi <b>there</b></p>").unwrap();
/// assert_eq!(nodes.len(), 1);
/// assert_eq!(nodes[0].tag(), Some("p"));
/// ```
#[derive(Debug, Clone)]
pub struct HtmlMarkup {
    max_bytes: usize,
}

impl HtmlMarkup {
    pub fn new(max_bytes: usize) -> Self {
        Self { max_bytes }
    }
}

impl Default for HtmlMarkup {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_MARKUP_BYTES)
    }
}

impl MarkupParser for HtmlMarkup {
    fn parse(&self, markup: &str) -> Result<Vec<ContentNode>> {
        if markup.len() > self.max_bytes {
            return Err(PasteError::MarkupTooLarge {
                size: markup.len(),
                limit: self.max_bytes,
            });
        }

        check_open_tags(markup)?;

        let fragment = Html::parse_fragment(markup);
        if !fragment.errors.is_empty() {
            tracing::debug!("Recovered from {} markup parse errors", fragment.errors.len());
        }

        // Fragments are rooted at a synthetic <html> element.
        let nodes = convert_children(*fragment.root_element(), 0)?;
        if nodes.is_empty() {
            return Err(PasteError::EmptyMarkup);
        }
        Ok(nodes)
    }
}

/// Cheap estimate of the nesting depth of raw markup. Stray end tags and
/// content of raw-text elements make it imprecise, so it only guards against
/// pathological input; the exact limit is enforced during conversion.
fn check_open_tags(markup: &str) -> Result<()> {
    let mut open = 0usize;
    for caps in TAG_RE.captures_iter(markup) {
        let name = caps[2].to_ascii_lowercase();
        if is_void(&name) || SELF_CLOSING_FLOW.contains(&name.as_str()) {
            continue;
        }
        if caps[1].is_empty() {
            open += 1;
            if open > MAX_OPEN_TAGS {
                return Err(PasteError::MarkupTooDeep {
                    limit: MAX_NESTING_DEPTH,
                });
            }
        } else {
            open = open.saturating_sub(1);
        }
    }
    Ok(())
}

fn convert_children(node: NodeRef<'_, Node>, depth: usize) -> Result<Vec<ContentNode>> {
    if depth > MAX_NESTING_DEPTH {
        return Err(PasteError::MarkupTooDeep {
            limit: MAX_NESTING_DEPTH,
        });
    }
    let mut out = Vec::new();
    for child in node.children() {
        if let Some(converted) = convert_node(child, depth)? {
            out.push(converted);
        }
    }
    Ok(out)
}

fn convert_node(node: NodeRef<'_, Node>, depth: usize) -> Result<Option<ContentNode>> {
    let converted = match node.value() {
        Node::Text(text) => ContentNode::Text(text.to_string()),
        Node::Element(el) => ContentNode::Element(Element {
            tag: el.name().to_ascii_lowercase(),
            attributes: el
                .attrs()
                .map(|(k, v)| (k.to_ascii_lowercase(), v.to_string()))
                .collect(),
            children: convert_children(node, depth + 1)?,
        }),
        // Comments carry office conditional blocks; doctypes and processing
        // instructions carry nothing worth keeping.
        _ => return Ok(None),
    };
    Ok(Some(converted))
}

/// Serialize a node sequence back to HTML.
pub fn serialize(nodes: &[ContentNode]) -> String {
    let mut out = String::new();
    for node in nodes {
        serialize_node(node, &mut out);
    }
    out
}

fn serialize_node(node: &ContentNode, out: &mut String) {
    match node {
        ContentNode::Text(text) => {
            out.push_str(&html_escape::encode_text(text));
        }
        ContentNode::Element(el) => {
            out.push('<');
            out.push_str(&el.tag);
            for (k, v) in &el.attributes {
                out.push(' ');
                out.push_str(k);
                out.push_str("=\"");
                out.push_str(&html_escape::encode_double_quoted_attribute(v));
                out.push('"');
            }
            out.push('>');

            if is_void(&el.tag) {
                return;
            }

            for child in &el.children {
                serialize_node(child, out);
            }

            out.push_str("</");
            out.push_str(&el.tag);
            out.push('>');
        }
    }
}
