//! Bottom-up classification and rewrite of the content tree.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::media::is_unresolved_src;
use crate::node::{ContentNode, Element};
use crate::sanitizer::Decorations;
use crate::sanitizer::policy::{self, PolicyAction};

static UNSAFE_HREF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:javascript|vbscript|data|file):")
        .expect("UNSAFE_HREF_RE: hardcoded regex is valid")
});

/// Rewrite a node sequence against the policy tables.
///
/// Children are rewritten before their parent is classified, so an unwrapped
/// parent promotes already-clean content. Text passes through untouched.
pub fn rewrite(nodes: Vec<ContentNode>, decorations: &Decorations) -> Vec<ContentNode> {
    rewrite_nodes(nodes, decorations, false)
}

fn rewrite_nodes(
    nodes: Vec<ContentNode>,
    decorations: &Decorations,
    in_pre: bool,
) -> Vec<ContentNode> {
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        rewrite_into(node, decorations, in_pre, &mut out);
    }
    out
}

fn rewrite_into(
    node: ContentNode,
    decorations: &Decorations,
    in_pre: bool,
    out: &mut Vec<ContentNode>,
) {
    let el = match node {
        ContentNode::Text(_) => {
            out.push(node);
            return;
        }
        ContentNode::Element(el) => el,
    };

    let entry = policy::lookup(&el.tag);
    match entry.action {
        PolicyAction::Remove => {}
        PolicyAction::Unwrap => {
            for child in el.children {
                rewrite_into(child, decorations, in_pre, out);
            }
        }
        PolicyAction::Keep => {
            let tag = el.tag.to_ascii_lowercase();
            let attributes: BTreeMap<String, String> = el
                .attributes
                .into_iter()
                .filter(|(name, _)| entry.allows(name))
                .collect();

            if tag == "img" && attributes.get("src").is_none_or(|src| is_unresolved_src(src)) {
                tracing::debug!("Dropping image without a usable src");
                return;
            }

            let children = rewrite_nodes(el.children, decorations, in_pre || tag == "pre");
            let mut kept = Element {
                tag,
                attributes,
                children,
            };
            strip_unsafe_href(&mut kept);
            decorate(&mut kept, decorations, in_pre);
            out.push(ContentNode::Element(kept));
        }
    }
}

fn strip_unsafe_href(el: &mut Element) {
    if el.tag != "a" {
        return;
    }
    if el
        .attr("href")
        .is_some_and(|href| UNSAFE_HREF_RE.is_match(href.trim()))
    {
        tracing::debug!("Stripping unsafe link target");
        el.attributes.remove("href");
    }
}

/// Add presentational defaults the author did not set. `<code>` inside a
/// `<pre>` is styled by its block and left alone.
fn decorate(el: &mut Element, decorations: &Decorations, in_pre: bool) {
    let class = match el.tag.as_str() {
        "table" => decorations.table_class.as_deref(),
        "img" => decorations.image_class.as_deref(),
        "blockquote" => decorations.quote_class.as_deref(),
        "pre" => decorations.code_class.as_deref(),
        "code" if !in_pre => decorations.inline_code_class.as_deref(),
        "ul" | "ol" => decorations.list_class.as_deref(),
        "a" if el.attributes.contains_key("href") => {
            set_default(el, "target", decorations.link_target.as_deref());
            set_default(el, "rel", decorations.link_rel.as_deref());
            None
        }
        _ => None,
    };
    set_default(el, "class", class);
}

fn set_default(el: &mut Element, name: &str, value: Option<&str>) {
    let Some(value) = value.filter(|v| !v.is_empty()) else {
        return;
    };
    el.attributes
        .entry(name.to_string())
        .or_insert_with(|| value.to_string());
}
