//! Reduction of arbitrary pasted markup to the approved subset.
//!
//! Two stages run in order:
//!
//! - [`rewrite`] -- applies the [`policy`] tables bottom-up (keep, unwrap or
//!   remove each element, filter attributes, drop unresolved images, add
//!   presentational defaults).
//! - [`normalize`] -- flattens wrapper containers, groups stray root inline
//!   content into paragraphs, splits paragraphs at doubled breaks and prunes
//!   empty nodes.
//!
//! [`Sanitizer`] bundles both with a set of [`Decorations`].

mod normalize;
pub mod policy;
mod rewrite;

pub use normalize::normalize;
pub use policy::{PolicyAction, PolicyEntry};
pub use rewrite::rewrite;

use crate::markup::{HtmlMarkup, MarkupParser, serialize};
use crate::node::ContentNode;

/// Presentational attributes synthesized on kept elements when the author
/// did not set them. `None` disables a default.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Decorations {
    pub table_class: Option<String>,
    pub image_class: Option<String>,
    pub quote_class: Option<String>,
    /// Class for `<pre>` blocks.
    pub code_class: Option<String>,
    /// Class for `<code>` outside a `<pre>`.
    pub inline_code_class: Option<String>,
    pub list_class: Option<String>,
    pub link_target: Option<String>,
    pub link_rel: Option<String>,
}

impl Decorations {
    /// Decorations that synthesize nothing.
    pub fn none() -> Self {
        Self {
            table_class: None,
            image_class: None,
            quote_class: None,
            code_class: None,
            inline_code_class: None,
            list_class: None,
            link_target: None,
            link_rel: None,
        }
    }
}

impl Default for Decorations {
    fn default() -> Self {
        Self {
            table_class: Some("table table-bordered table-striped".to_string()),
            image_class: Some("img-fluid".to_string()),
            quote_class: Some("blockquote".to_string()),
            code_class: Some("code-block".to_string()),
            inline_code_class: Some("code-inline".to_string()),
            list_class: Some("list".to_string()),
            link_target: Some("_blank".to_string()),
            link_rel: Some("noopener noreferrer".to_string()),
        }
    }
}

/// Rewrite followed by normalization.
///
/// # Example
///
/// ```
/// use paste_sanitizer::Sanitizer;
///
/// let html = Sanitizer::default().clean_markup(r#"<span style="color:red">Plain text</span>"#);
/// assert_eq!(html, "<p>Plain text</p>");
/// ```
#[derive(Clone, Debug, Default)]
pub struct Sanitizer {
    decorations: Decorations,
}

impl Sanitizer {
    pub fn new(decorations: Decorations) -> Self {
        Self { decorations }
    }

    pub fn decorations(&self) -> &Decorations {
        &self.decorations
    }

    /// Apply the policy tables only.
    pub fn rewrite(&self, nodes: Vec<ContentNode>) -> Vec<ContentNode> {
        rewrite(nodes, &self.decorations)
    }

    /// Rewrite and normalize a tree.
    pub fn clean(&self, nodes: Vec<ContentNode>) -> Vec<ContentNode> {
        normalize(self.rewrite(nodes))
    }

    /// Parse, clean and serialize markup without media resolution; images
    /// with local or embedded sources are dropped.
    ///
    /// Markup the parser rejects yields an empty string.
    pub fn clean_markup(&self, markup: &str) -> String {
        match HtmlMarkup::default().parse(markup) {
            Ok(nodes) => serialize(&self.clean(nodes)),
            Err(e) => {
                tracing::debug!("Nothing to clean: {e}");
                String::new()
            }
        }
    }
}
