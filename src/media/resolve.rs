//! Concurrent upload of queued images and the batch commit of their URLs.

use std::collections::HashMap;

use crate::media::{
    BinaryBlob, ClipboardReader, MEDIA_ID_ATTR, MediaId, MediaReference, MediaScan,
    NoClipboardAccess, Uploader,
};
use crate::node::ContentNode;

/// Where payload-less references look for their bytes.
///
/// Binary items attached to the paste event are preferred; the live
/// clipboard is only read when the event carried none.
pub struct MediaSources<'a, C = NoClipboardAccess> {
    event_items: &'a [BinaryBlob],
    live: Option<&'a C>,
}

impl<'a> MediaSources<'a, NoClipboardAccess> {
    pub fn new(event_items: &'a [BinaryBlob]) -> Self {
        Self {
            event_items,
            live: None,
        }
    }
}

impl<'a, C: ClipboardReader> MediaSources<'a, C> {
    /// Attach a live clipboard read capability.
    pub fn with_live<R: ClipboardReader>(self, reader: &'a R) -> MediaSources<'a, R> {
        MediaSources {
            event_items: self.event_items,
            live: Some(reader),
        }
    }

    pub(crate) fn from_parts(event_items: &'a [BinaryBlob], live: Option<&'a C>) -> Self {
        Self { event_items, live }
    }

    async fn clipboard_images(&self) -> Vec<BinaryBlob> {
        let from_event: Vec<BinaryBlob> = self
            .event_items
            .iter()
            .filter(|item| item.is_image())
            .cloned()
            .collect();
        if !from_event.is_empty() {
            return from_event;
        }

        let Some(reader) = self.live else {
            return Vec::new();
        };
        match reader.read_images().await {
            Ok(items) => items.into_iter().filter(BinaryBlob::is_image).collect(),
            Err(e) => {
                tracing::warn!("Failed to read images from the live clipboard: {e}");
                Vec::new()
            }
        }
    }
}

/// Outcome of [`resolve_media`].
#[derive(Debug)]
pub struct MediaResolution {
    /// The tree with every successful upload committed. Unresolved images
    /// keep their placeholder so the rewriter drops them.
    pub nodes: Vec<ContentNode>,
    pub references: Vec<MediaReference>,
    pub had_unresolvable: bool,
    pub uploaded: usize,
    pub unresolved: usize,
}

/// Resolve every queued reference and commit the results.
///
/// Each reference takes exactly one path: its own payload, else the
/// clipboard image at the same position among payload-less references,
/// else unresolvable. All uploads run concurrently and the tree is only
/// touched after every one of them has settled.
pub async fn resolve_media<U: Uploader, C: ClipboardReader>(
    scan: MediaScan,
    uploader: &U,
    sources: &MediaSources<'_, C>,
) -> MediaResolution {
    let MediaScan {
        nodes,
        mut references,
        ..
    } = scan;

    if references.is_empty() {
        return MediaResolution {
            nodes,
            references,
            had_unresolvable: false,
            uploaded: 0,
            unresolved: 0,
        };
    }

    if references.iter().any(|r| !r.has_payload()) {
        let mut clipboard = sources.clipboard_images().await.into_iter();
        for reference in references.iter_mut().filter(|r| r.payload.is_none()) {
            match clipboard.next() {
                Some(blob) => reference.payload = Some(blob),
                None => break,
            }
        }
    }

    let jobs: Vec<(MediaId, Option<BinaryBlob>)> = references
        .iter_mut()
        .map(|r| (r.id, r.payload.take()))
        .collect();

    let futs = jobs.into_iter().map(|(id, payload)| async move {
        let Some(blob) = payload else {
            tracing::warn!(%id, "No image data available for pasted image");
            return (id, None);
        };
        let size = blob.bytes.len();
        match uploader.upload(blob).await {
            Ok(url) => {
                tracing::debug!(%id, "Uploaded {size} bytes to {url}");
                (id, Some(url))
            }
            Err(e) => {
                tracing::warn!(%id, "Failed to upload pasted image: {e}");
                (id, None)
            }
        }
    });

    let settled: HashMap<MediaId, Option<String>> =
        futures::future::join_all(futs).await.into_iter().collect();

    for reference in &mut references {
        reference.resolved_url = settled.get(&reference.id).cloned().flatten();
    }

    let uploaded = references
        .iter()
        .filter(|r| r.resolved_url.is_some())
        .count();
    let unresolved = references.len() - uploaded;

    let nodes = commit(nodes, &settled);
    tracing::debug!(uploaded, unresolved, "Media resolution complete");

    MediaResolution {
        nodes,
        references,
        had_unresolvable: unresolved > 0,
        uploaded,
        unresolved,
    }
}

fn commit(nodes: Vec<ContentNode>, settled: &HashMap<MediaId, Option<String>>) -> Vec<ContentNode> {
    nodes
        .into_iter()
        .map(|node| match node {
            ContentNode::Element(mut el) => {
                if let Some(raw_id) = el.attributes.remove(MEDIA_ID_ATTR) {
                    let url = raw_id
                        .parse()
                        .ok()
                        .and_then(|id| settled.get(&MediaId(id)).cloned().flatten());
                    if let Some(url) = url {
                        el.attributes.insert("src".to_string(), url);
                    }
                }
                el.children = commit(std::mem::take(&mut el.children), settled);
                ContentNode::Element(el)
            }
            text => text,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::error::{PasteError, Result};
    use crate::markup::{HtmlMarkup, MarkupParser, serialize};
    use crate::media::{PLACEHOLDER_SRC, scan};

    /// Uploader that records what it received and hands out sequential URLs.
    struct RecordingUploader {
        received: Mutex<Vec<BinaryBlob>>,
        fail_mime: Option<&'static str>,
    }

    impl RecordingUploader {
        fn new() -> Self {
            Self {
                received: Mutex::new(Vec::new()),
                fail_mime: None,
            }
        }
    }

    impl Uploader for RecordingUploader {
        async fn upload(&self, blob: BinaryBlob) -> Result<String> {
            if self.fail_mime == Some(blob.mime_type.as_str()) {
                return Err(PasteError::Upload("simulated failure".into()));
            }
            let url = format!("https://cdn/{}.png", String::from_utf8_lossy(&blob.bytes));
            self.received.lock().unwrap().push(blob);
            Ok(url)
        }
    }

    struct LiveClipboard(Vec<BinaryBlob>);

    impl ClipboardReader for LiveClipboard {
        async fn read_images(&self) -> Result<Vec<BinaryBlob>> {
            Ok(self.0.clone())
        }
    }

    fn parse(html: &str) -> Vec<ContentNode> {
        HtmlMarkup::default().parse(html).unwrap()
    }

    #[tokio::test]
    async fn nothing_queued_is_a_no_op() {
        let uploader = RecordingUploader::new();
        let nodes = parse("<p>plain</p>");
        let result = resolve_media(scan(nodes.clone()), &uploader, &MediaSources::new(&[])).await;
        assert_eq!(result.nodes, nodes);
        assert!(!result.had_unresolvable);
        assert!(uploader.received.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn embedded_payload_is_uploaded_directly() {
        let uploader = RecordingUploader::new();
        let scanned = scan(parse(r#"<img src="data:image/png;base64,aGVsbG8=">"#));
        let result = resolve_media(scanned, &uploader, &MediaSources::new(&[])).await;

        assert!(!result.had_unresolvable);
        assert_eq!(result.uploaded, 1);
        assert_eq!(serialize(&result.nodes), r#"<img src="https://cdn/hello.png">"#);
        assert_eq!(uploader.received.lock().unwrap()[0].bytes, b"hello");
    }

    #[tokio::test]
    async fn local_paths_correlate_with_event_items_in_order() {
        let uploader = RecordingUploader::new();
        let scanned = scan(parse(concat!(
            r#"<img src="file:///a.png">"#,
            r#"<img src="data:image/png;base64,aGVsbG8=">"#,
            r#"<img src="file:///b.png">"#,
        )));
        let items = [
            BinaryBlob::new("image/png", b"first".to_vec()),
            BinaryBlob::new("image/png", b"second".to_vec()),
        ];
        let result = resolve_media(scanned, &uploader, &MediaSources::new(&items)).await;

        assert!(!result.had_unresolvable);
        assert_eq!(
            serialize(&result.nodes),
            concat!(
                r#"<img src="https://cdn/first.png">"#,
                r#"<img src="https://cdn/hello.png">"#,
                r#"<img src="https://cdn/second.png">"#,
            )
        );
        let urls: Vec<(MediaId, Option<&str>)> = result
            .references
            .iter()
            .map(|r| (r.id, r.resolved_url.as_deref()))
            .collect();
        assert_eq!(
            urls,
            [
                (MediaId(0), Some("https://cdn/first.png")),
                (MediaId(1), Some("https://cdn/hello.png")),
                (MediaId(2), Some("https://cdn/second.png")),
            ]
        );
    }

    #[tokio::test]
    async fn fewer_clipboard_items_than_local_images() {
        let uploader = RecordingUploader::new();
        let scanned = scan(parse(concat!(
            r#"<p><img src="file:///a.png"></p>"#,
            r#"<p><img src="file:///b.png"></p>"#,
        )));
        let items = [BinaryBlob::new("image/png", b"only".to_vec())];
        let result = resolve_media(scanned, &uploader, &MediaSources::new(&items)).await;

        assert!(result.had_unresolvable);
        assert_eq!(result.uploaded, 1);
        assert_eq!(result.unresolved, 1);
        assert_eq!(
            result.references[0].resolved_url.as_deref(),
            Some("https://cdn/only.png")
        );
        assert!(result.references[1].resolved_url.is_none());
        assert_eq!(
            serialize(&result.nodes),
            format!(r#"<p><img src="https://cdn/only.png"></p><p><img src="{PLACEHOLDER_SRC}"></p>"#)
        );
    }

    #[tokio::test]
    async fn live_clipboard_is_used_when_event_has_no_items() {
        let uploader = RecordingUploader::new();
        let live = LiveClipboard(vec![BinaryBlob::new("image/jpeg", b"jpeg".to_vec())]);
        let scanned = scan(parse(r#"<img src="C:\Temp\photo.jpg">"#));
        let sources = MediaSources::new(&[]).with_live(&live);
        let result = resolve_media(scanned, &uploader, &sources).await;

        assert!(!result.had_unresolvable);
        assert_eq!(serialize(&result.nodes), r#"<img src="https://cdn/jpeg.png">"#);
    }

    #[tokio::test]
    async fn missing_payload_is_unresolvable() {
        let uploader = RecordingUploader::new();
        let scanned = scan(parse(r#"<p>a<img src="file:///a.png"></p>"#));
        let result = resolve_media(scanned, &uploader, &MediaSources::new(&[])).await;

        assert!(result.had_unresolvable);
        assert_eq!(result.unresolved, 1);
        let html = serialize(&result.nodes);
        assert!(html.contains(PLACEHOLDER_SRC));
        assert!(!html.contains(MEDIA_ID_ATTR));
    }

    #[tokio::test]
    async fn failed_upload_is_unresolvable_but_others_commit() {
        let uploader = RecordingUploader {
            received: Mutex::new(Vec::new()),
            fail_mime: Some("image/gif"),
        };
        let scanned = scan(parse(concat!(
            r#"<img src="data:image/gif;base64,aGVsbG8=">"#,
            r#"<img src="data:image/png;base64,aGVsbG8=">"#,
        )));
        let result = resolve_media(scanned, &uploader, &MediaSources::new(&[])).await;

        assert!(result.had_unresolvable);
        assert_eq!(result.uploaded, 1);
        let html = serialize(&result.nodes);
        assert!(html.contains(PLACEHOLDER_SRC));
        assert!(html.contains("https://cdn/hello.png"));
    }
}
