//! Structural normalization of a rewritten tree.
//!
//! Four passes run in order: nested-container flattening, root inline
//! grouping, paragraph break splitting and empty-node pruning. The whole
//! sequence is repeated until the tree stops changing, which makes
//! [`normalize`] idempotent.

use crate::markup::is_void;
use crate::node::{ContentNode, Element};

const GENERIC_CONTAINERS: &[&str] = &["div", "span"];

const BLOCK_TAGS: &[&str] = &[
    "p", "div", "h1", "h2", "h3", "h4", "h5", "h6", "ul", "ol", "li", "table", "caption", "thead",
    "tbody", "tfoot", "tr", "th", "td", "blockquote", "pre", "hr",
];

/// Removed when they hold nothing but whitespace.
const PRUNABLE: &[&str] = &[
    "p", "div", "span", "li", "a", "b", "strong", "em", "i", "u", "s", "sub", "sup", "code", "h1",
    "h2", "h3", "h4", "h5", "h6", "ul", "ol", "blockquote",
];

/// Descendants that make an otherwise blank element worth keeping.
const CONTENT_BEARING: &[&str] = &["img", "table", "hr", "br"];

const TABLE_CELLS: &[&str] = &["td", "th"];

const MAX_ROUNDS: usize = 16;

/// Normalize a rewritten tree to a fixed point.
pub fn normalize(nodes: Vec<ContentNode>) -> Vec<ContentNode> {
    let mut current = nodes;
    for round in 1..=MAX_ROUNDS {
        let next = normalize_once(current.clone());
        if next == current {
            tracing::debug!("Normalization settled after {round} rounds");
            return next;
        }
        current = next;
    }
    tracing::warn!("Normalization did not settle after {MAX_ROUNDS} rounds");
    current
}

fn normalize_once(nodes: Vec<ContentNode>) -> Vec<ContentNode> {
    let nodes = flatten(nodes);
    let nodes = group_inline_runs(nodes);
    let nodes = split_breaks(nodes);
    prune(nodes)
}

fn is_tag(node: &ContentNode, tags: &[&str]) -> bool {
    node.tag().is_some_and(|tag| tags.contains(&tag))
}

fn paragraph(children: Vec<ContentNode>) -> ContentNode {
    Element::new("p").with_children(children).into()
}

// --- pass 1: nested-container flattening ----------------------------------

fn flatten(nodes: Vec<ContentNode>) -> Vec<ContentNode> {
    let nodes = nodes
        .into_iter()
        .map(|node| match node {
            ContentNode::Element(mut el) => {
                el.children = flatten(std::mem::take(&mut el.children));
                ContentNode::Element(el)
            }
            text => text,
        })
        .collect();
    dissolve_sole_container(nodes)
}

/// A generic container that is the only non-whitespace content of its parent
/// adds nothing; splice its children into the parent instead.
fn dissolve_sole_container(mut nodes: Vec<ContentNode>) -> Vec<ContentNode> {
    loop {
        let significant: Vec<usize> = nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| !node.is_whitespace_text())
            .map(|(i, _)| i)
            .collect();
        let &[idx] = significant.as_slice() else {
            return nodes;
        };
        if !is_tag(&nodes[idx], GENERIC_CONTAINERS) {
            return nodes;
        }
        if let ContentNode::Element(inner) = nodes.remove(idx) {
            nodes.splice(idx..idx, inner.children);
        }
    }
}

// --- pass 2: root inline grouping ------------------------------------------

fn group_inline_runs(nodes: Vec<ContentNode>) -> Vec<ContentNode> {
    let mut out = Vec::with_capacity(nodes.len());
    let mut run = Vec::new();
    for node in nodes {
        if is_tag(&node, BLOCK_TAGS) {
            flush_run(&mut run, &mut out);
            out.push(node);
        } else {
            run.push(node);
        }
    }
    flush_run(&mut run, &mut out);
    out
}

fn flush_run(run: &mut Vec<ContentNode>, out: &mut Vec<ContentNode>) {
    if run.iter().all(ContentNode::is_whitespace_text) {
        run.clear();
        return;
    }
    out.push(paragraph(std::mem::take(run)));
}

// --- pass 3: break normalization -------------------------------------------

fn is_break(node: &ContentNode) -> bool {
    node.tag() == Some("br")
}

fn split_breaks(nodes: Vec<ContentNode>) -> Vec<ContentNode> {
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        match node {
            ContentNode::Element(mut el) => {
                el.children = split_breaks(std::mem::take(&mut el.children));
                if el.tag == "p" {
                    out.extend(split_paragraph(el));
                } else {
                    out.push(ContentNode::Element(el));
                }
            }
            text => out.push(text),
        }
    }
    out
}

/// Split a paragraph at every run of two or more line breaks (whitespace
/// between the breaks belongs to the run) and trim breaks off the edges.
/// Runs inside inline formatting (`<p><b>A<br><br>B</b></p>`) split the
/// formatting element first so the paragraph can split around it.
fn split_paragraph(p: Element) -> Vec<ContentNode> {
    let Element {
        tag,
        attributes,
        children,
    } = p;

    split_at_break_runs(hoist_breaks(children))
        .into_iter()
        .map(|segment| {
            ContentNode::Element(Element {
                tag: tag.clone(),
                attributes: attributes.clone(),
                children: trim_edges(segment),
            })
        })
        .collect()
}

fn split_at_break_runs(children: Vec<ContentNode>) -> Vec<Vec<ContentNode>> {
    let mut segments = Vec::new();
    let mut current = Vec::new();
    let mut pending = Vec::new();
    let mut breaks = 0;

    for child in children {
        if is_break(&child) {
            breaks += 1;
            pending.push(child);
        } else if child.is_whitespace_text() && !pending.is_empty() {
            pending.push(child);
        } else {
            if breaks >= 2 {
                segments.push(std::mem::take(&mut current));
                pending.clear();
            } else {
                current.append(&mut pending);
            }
            breaks = 0;
            current.push(child);
        }
    }
    current.append(&mut pending);
    segments.push(current);
    segments
}

/// Replace each inline element holding a break run with one copy per
/// segment, separated by a double break at the parent's level.
fn hoist_breaks(children: Vec<ContentNode>) -> Vec<ContentNode> {
    let mut out = Vec::with_capacity(children.len());
    for child in children {
        let ContentNode::Element(mut el) = child else {
            out.push(child);
            continue;
        };
        if is_void(&el.tag) || BLOCK_TAGS.contains(&el.tag.as_str()) {
            out.push(ContentNode::Element(el));
            continue;
        }
        let mut segments = split_at_break_runs(hoist_breaks(std::mem::take(&mut el.children)));
        if segments.len() == 1 {
            el.children = segments.pop().unwrap_or_default();
            out.push(ContentNode::Element(el));
            continue;
        }
        for (i, segment) in segments.into_iter().enumerate() {
            if i > 0 {
                out.push(Element::new("br").into());
                out.push(Element::new("br").into());
            }
            out.push(ContentNode::Element(Element {
                tag: el.tag.clone(),
                attributes: el.attributes.clone(),
                children: trim_edges(segment),
            }));
        }
    }
    out
}

fn trim_edges(mut children: Vec<ContentNode>) -> Vec<ContentNode> {
    let edge = |node: &ContentNode| is_break(node) || node.is_whitespace_text();
    while children.last().is_some_and(edge) {
        children.pop();
    }
    let leading = children.iter().take_while(|node| edge(node)).count();
    children.drain(..leading);
    children
}

// --- pass 4: empty-node pruning --------------------------------------------

fn prune(nodes: Vec<ContentNode>) -> Vec<ContentNode> {
    nodes.into_iter().filter_map(prune_node).collect()
}

fn prune_node(node: ContentNode) -> Option<ContentNode> {
    let ContentNode::Element(mut el) = node else {
        return Some(node);
    };
    if is_void(&el.tag) {
        return Some(ContentNode::Element(el));
    }

    el.children = prune(std::mem::take(&mut el.children));
    if el.children.is_empty() {
        if TABLE_CELLS.contains(&el.tag.as_str()) {
            // keeps the table's shape
            el.children.push(Element::new("br").into());
            return Some(ContentNode::Element(el));
        }
        return None;
    }
    if PRUNABLE.contains(&el.tag.as_str()) && is_blank(&el.children) {
        return None;
    }
    Some(ContentNode::Element(el))
}

fn is_blank(children: &[ContentNode]) -> bool {
    children.iter().all(|child| match child {
        ContentNode::Text(_) => child.is_whitespace_text(),
        ContentNode::Element(el) => {
            !CONTENT_BEARING.contains(&el.tag.as_str()) && is_blank(&el.children)
        }
    })
}
