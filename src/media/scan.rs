//! Scan a freshly parsed tree for images that need resolution.

use crate::media::{
    BinaryBlob, MEDIA_ID_ATTR, MediaId, MediaKind, MediaReference, PLACEHOLDER_SRC, classify_src,
    clip_fallback, decode_data_uri,
};
use crate::node::{ContentNode, Element};
use crate::sanitizer::policy::{self, PolicyAction};

/// Tags that carry an image reference in their `src`.
const IMAGE_CARRIERS: &[&str] = &["img", "image", "v:imagedata"];

/// Result of [`scan`]: the tagged tree plus the queue of references.
#[derive(Debug, Default)]
pub struct MediaScan {
    pub nodes: Vec<ContentNode>,
    pub references: Vec<MediaReference>,
    /// Number of clip artifacts replaced by their text fallback.
    pub clip_artifacts: usize,
}

/// Walk the tree before any attribute stripping and queue every image whose
/// `src` is a local path or embedded payload. Subtrees the rewrite removes
/// are skipped.
///
/// Queued images are rewritten to `<img>` with [`PLACEHOLDER_SRC`] and a
/// [`MEDIA_ID_ATTR`] so the resolved URL lands in the same node later.
/// Clip artifacts become plain text immediately and are never uploaded.
pub fn scan(nodes: Vec<ContentNode>) -> MediaScan {
    let mut scanner = Scanner::default();
    let nodes = scanner.scan_nodes(nodes);
    tracing::debug!(
        queued = scanner.references.len(),
        clip_artifacts = scanner.clip_artifacts,
        "Media scan complete"
    );
    MediaScan {
        nodes,
        references: scanner.references,
        clip_artifacts: scanner.clip_artifacts,
    }
}

/// Build a one-image tree for a clipboard that carried only binary image
/// data. The blob is queued as the image's own payload.
pub fn scan_image_item(blob: BinaryBlob) -> MediaScan {
    let mut scanner = Scanner::default();
    let id = scanner.queue(String::new(), MediaKind::EmbeddedData, Some(blob));
    let img = Element::new("img")
        .with_attr("src", PLACEHOLDER_SRC)
        .with_attr(MEDIA_ID_ATTR, id.to_string());
    MediaScan {
        nodes: vec![img.into()],
        references: scanner.references,
        clip_artifacts: 0,
    }
}

#[derive(Default)]
struct Scanner {
    next_id: u32,
    references: Vec<MediaReference>,
    clip_artifacts: usize,
}

impl Scanner {
    fn scan_nodes(&mut self, nodes: Vec<ContentNode>) -> Vec<ContentNode> {
        nodes.into_iter().map(|node| self.scan_node(node)).collect()
    }

    fn scan_node(&mut self, node: ContentNode) -> ContentNode {
        match node {
            ContentNode::Element(el) if IMAGE_CARRIERS.contains(&el.tag.as_str()) => {
                self.scan_image(el)
            }
            // The rewrite discards this subtree, so nothing in it is worth uploading.
            ContentNode::Element(el) if policy::lookup(&el.tag).action == PolicyAction::Remove => {
                ContentNode::Element(el)
            }
            ContentNode::Element(mut el) => {
                el.children = self.scan_nodes(std::mem::take(&mut el.children));
                ContentNode::Element(el)
            }
            text => text,
        }
    }

    fn scan_image(&mut self, mut el: Element) -> ContentNode {
        if let Some(fallback) = clip_fallback(&el) {
            self.clip_artifacts += 1;
            return ContentNode::Text(fallback);
        }

        // VML carriers only survive the rewrite as plain images.
        if el.tag != "img" {
            el.tag = "img".to_string();
            el.children.clear();
            if let Some(title) = el.attributes.remove("o:title") {
                el.attributes.entry("alt".to_string()).or_insert(title);
            }
        }

        let src = el.attr("src").unwrap_or_default().trim().to_string();
        let Some(kind) = classify_src(&src) else {
            return ContentNode::Element(el);
        };

        let payload = match kind {
            MediaKind::EmbeddedData => decode_data_uri(&src),
            MediaKind::LocalPath | MediaKind::ClipArtifact => None,
        };

        let id = self.queue(src, kind, payload);
        el.attributes.insert("src".to_string(), PLACEHOLDER_SRC.to_string());
        el.attributes.insert(MEDIA_ID_ATTR.to_string(), id.to_string());
        ContentNode::Element(el)
    }

    fn queue(
        &mut self,
        original_value: String,
        kind: MediaKind,
        payload: Option<BinaryBlob>,
    ) -> MediaId {
        let id = MediaId(self.next_id);
        self.next_id += 1;
        tracing::debug!(%id, ?kind, has_payload = payload.is_some(), "Queued image for upload");
        self.references.push(MediaReference {
            id,
            original_value,
            kind,
            resolved_url: None,
            payload,
        });
        id
    }
}
