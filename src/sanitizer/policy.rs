//! Static tag/attribute policy tables.

use std::collections::HashMap;
use std::sync::LazyLock;

/// What happens to an element with a given tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PolicyAction {
    /// Retain the element, filtering its attributes to the allow-list.
    Keep,
    /// Discard the element but promote its children to the parent.
    Unwrap,
    /// Discard the element together with its whole subtree.
    Remove,
}

/// Policy record for one tag name.
#[derive(Clone, Copy, Debug)]
pub struct PolicyEntry {
    pub action: PolicyAction,
    pub allowed_attributes: &'static [&'static str],
}

impl PolicyEntry {
    const UNWRAP: PolicyEntry = PolicyEntry {
        action: PolicyAction::Unwrap,
        allowed_attributes: &[],
    };

    pub fn allows(&self, attribute: &str) -> bool {
        self.allowed_attributes.contains(&attribute)
    }
}

const KEEP: &[(&str, &[&str])] = &[
    ("p", &[]),
    ("div", &[]),
    ("h1", &[]),
    ("h2", &[]),
    ("h3", &[]),
    ("h4", &[]),
    ("h5", &[]),
    ("h6", &[]),
    ("blockquote", &["class"]),
    ("pre", &["class"]),
    ("code", &["class"]),
    ("ul", &["class"]),
    ("ol", &["class", "start"]),
    ("li", &[]),
    ("table", &["class"]),
    ("caption", &[]),
    ("thead", &[]),
    ("tbody", &[]),
    ("tfoot", &[]),
    ("tr", &[]),
    ("th", &["colspan", "rowspan", "scope"]),
    ("td", &["colspan", "rowspan"]),
    ("a", &["href", "title", "target", "rel"]),
    ("img", &["src", "alt", "title", "width", "height", "class"]),
    ("br", &[]),
    ("hr", &[]),
    ("strong", &[]),
    ("b", &[]),
    ("em", &[]),
    ("i", &[]),
    ("u", &[]),
    ("s", &[]),
    ("sub", &[]),
    ("sup", &[]),
];

const REMOVE: &[&str] = &[
    // executable / embedding
    "script", "style", "noscript", "template", "iframe", "frame", "frameset", "object", "embed",
    "applet", "param", "canvas", "svg", "math", "audio", "video", "source", "track", "map", "area",
    // form controls
    "form", "input", "button", "select", "option", "optgroup", "textarea", "fieldset", "legend",
    "datalist", "output", "dialog",
    // document metadata
    "head", "title", "meta", "link", "base", "xml", "col", "colgroup",
];

static POLICY: LazyLock<HashMap<&'static str, PolicyEntry>> = LazyLock::new(|| {
    let mut table = HashMap::with_capacity(KEEP.len() + REMOVE.len());
    for &(tag, allowed_attributes) in KEEP {
        table.insert(
            tag,
            PolicyEntry {
                action: PolicyAction::Keep,
                allowed_attributes,
            },
        );
    }
    for &tag in REMOVE {
        table.insert(
            tag,
            PolicyEntry {
                action: PolicyAction::Remove,
                allowed_attributes: &[],
            },
        );
    }
    table
});

/// Look up the policy for a tag name.
///
/// Lookup is case-insensitive. Vendor-prefixed tags (`o:p`, `w:sdt`, ...)
/// and tags absent from the tables are unwrapped so their content survives.
pub fn lookup(tag: &str) -> PolicyEntry {
    let tag = tag.to_ascii_lowercase();
    if tag.contains(':') {
        return PolicyEntry::UNWRAP;
    }
    POLICY.get(tag.as_str()).copied().unwrap_or(PolicyEntry::UNWRAP)
}

/// Returns `true` if elements with this tag survive the rewrite.
pub fn is_kept(tag: &str) -> bool {
    lookup(tag).action == PolicyAction::Keep
}
