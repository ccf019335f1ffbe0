use std::sync::{Arc, Mutex};
use std::time::Duration;

use paste_sanitizer::{
    BinaryBlob, ClipboardPayload, ClipboardReader, ContentNode, EditableSurface, FsStorage,
    MarkupParser, NotifyLevel, Notifier, PasteError, PasteEvent, PasteState, Paster,
    PasterBuilder, PayloadKind, Result, Sanitizer, Storage, StorageUploader, Uploader,
    cancel_pair,
};
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Shared, ordered log of everything the surface and notifier were asked to do.
type CallLog = Arc<Mutex<Vec<String>>>;

fn calls(log: &CallLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

/// Editable surface that records every call in order.
struct RecordingSurface {
    log: CallLog,
    content: Mutex<String>,
}

impl RecordingSurface {
    fn new(log: &CallLog) -> Self {
        Self {
            log: Arc::clone(log),
            content: Mutex::new(String::new()),
        }
    }

    fn content(&self) -> String {
        self.content.lock().unwrap().clone()
    }
}

impl EditableSurface for RecordingSurface {
    type Selection = u32;

    fn save_selection(&self) -> u32 {
        self.log.lock().unwrap().push("save_selection".into());
        7
    }

    fn restore_selection(&self, selection: &u32) {
        self.log
            .lock()
            .unwrap()
            .push(format!("restore_selection:{selection}"));
    }

    fn delete_selected_content(&self) {
        self.log.lock().unwrap().push("delete_selected".into());
    }

    fn insert_at(&self, content: &str) {
        self.log.lock().unwrap().push("insert".into());
        self.content.lock().unwrap().push_str(content);
    }

    fn focus(&self) {
        self.log.lock().unwrap().push("focus".into());
    }
}

struct RecordingNotifier {
    log: CallLog,
}

impl Notifier for RecordingNotifier {
    fn notify(&self, level: NotifyLevel, title: &str, _message: &str) {
        self.log
            .lock()
            .unwrap()
            .push(format!("notify:{level:?}:{title}"));
    }
}

/// Uploader that keeps blobs in memory and hands out CDN-style URLs.
#[derive(Clone, Default)]
struct MemoryUploader {
    blobs: Arc<Mutex<Vec<BinaryBlob>>>,
}

impl MemoryUploader {
    fn uploaded(&self) -> Vec<BinaryBlob> {
        self.blobs.lock().unwrap().clone()
    }
}

impl Uploader for MemoryUploader {
    async fn upload(&self, blob: BinaryBlob) -> Result<String> {
        let mut blobs = self.blobs.lock().unwrap();
        blobs.push(blob);
        if blobs.len() == 1 {
            Ok("https://cdn/x.png".to_string())
        } else {
            Ok(format!("https://cdn/{}.png", blobs.len()))
        }
    }
}

/// Uploader whose URL is derived from the uploaded bytes.
struct EchoUploader;

impl Uploader for EchoUploader {
    async fn upload(&self, blob: BinaryBlob) -> Result<String> {
        Ok(format!("https://cdn/{}.png", String::from_utf8_lossy(&blob.bytes)))
    }
}

/// Uploader that always fails -- for testing degraded pastes.
struct FailingUploader;

impl Uploader for FailingUploader {
    async fn upload(&self, _blob: BinaryBlob) -> Result<String> {
        Err(PasteError::Upload("simulated failure".into()))
    }
}

/// Uploader that never finishes.
struct StalledUploader;

impl Uploader for StalledUploader {
    async fn upload(&self, _blob: BinaryBlob) -> Result<String> {
        std::future::pending().await
    }
}

/// Parser that rejects everything.
struct RejectingParser;

impl MarkupParser for RejectingParser {
    fn parse(&self, _markup: &str) -> Result<Vec<ContentNode>> {
        Err(PasteError::EmptyMarkup)
    }
}

struct LiveClipboard(Vec<BinaryBlob>);

impl ClipboardReader for LiveClipboard {
    async fn read_images(&self) -> Result<Vec<BinaryBlob>> {
        Ok(self.0.clone())
    }
}

fn png(bytes: &[u8]) -> BinaryBlob {
    BinaryBlob::new("image/png", bytes.to_vec())
}

fn markup(html: &str) -> ClipboardPayload {
    ClipboardPayload::default().with_markup(html)
}

fn paster_with<U: Uploader>(uploader: U, log: &CallLog) -> Paster<U> {
    PasterBuilder::new(uploader)
        .notifier(RecordingNotifier {
            log: Arc::clone(log),
        })
        .build()
}

// ---------------------------------------------------------------------------
// Sanitizer on its own
// ---------------------------------------------------------------------------

#[test]
fn sanitizer_flattens_nested_wrappers() {
    let sanitizer = Sanitizer::default();
    assert_eq!(
        sanitizer.clean_markup("<div><div><p>Hello <b>world</b></p></div></div>"),
        "<p>Hello <b>world</b></p>"
    );
}

#[test]
fn sanitizer_removes_script_subtree() {
    let sanitizer = Sanitizer::default();
    assert_eq!(
        sanitizer.clean_markup("<script>evil()</script><p>ok</p>"),
        "<p>ok</p>"
    );
}

#[test]
fn sanitizer_groups_unwrapped_text() {
    let sanitizer = Sanitizer::default();
    assert_eq!(
        sanitizer.clean_markup(r#"<span style="color:red">Plain text</span>"#),
        "<p>Plain text</p>"
    );
}

#[test]
fn sanitizer_splits_double_breaks() {
    let sanitizer = Sanitizer::default();
    assert_eq!(sanitizer.clean_markup("<p>A<br><br>B</p>"), "<p>A</p><p>B</p>");
}

#[test]
fn sanitizer_output_is_stable() {
    let sanitizer = Sanitizer::default();
    let inputs = [
        r#"<div class="WordSection1"><p class="MsoNormal"><span lang="EN-US">One<o:p></o:p></span></p><p class="MsoNormal"><o:p>&nbsp;</o:p></p></div>"#,
        "<ul><li><div><span>item</span></div></li><li></li></ul>",
        "text<br><br>more<div>block</div>tail",
        r#"<table border="1"><tr><td style="x">a</td><td></td></tr></table>"#,
    ];
    for input in inputs {
        let once = sanitizer.clean_markup(input);
        assert_eq!(sanitizer.clean_markup(&once), once, "input: {input}");
    }
}

// ---------------------------------------------------------------------------
// End-to-end: markup pastes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn markup_paste_inserts_clean_content_in_order() {
    let log = CallLog::default();
    let surface = RecordingSurface::new(&log);
    let paster = paster_with(MemoryUploader::default(), &log);

    let outcome = paster
        .paste(
            &surface,
            PasteEvent::new(markup("<div><div><p>Hello <b>world</b></p></div></div>")),
        )
        .await;

    assert_eq!(outcome.state, PasteState::Done);
    assert_eq!(outcome.kind, PayloadKind::Markup);
    assert_eq!(surface.content(), "<p>Hello <b>world</b></p>");
    assert_eq!(
        calls(&log),
        [
            "save_selection",
            "restore_selection:7",
            "delete_selected",
            "insert",
            "focus",
        ]
    );
}

#[tokio::test]
async fn local_image_is_uploaded_from_event_item() {
    let log = CallLog::default();
    let surface = RecordingSurface::new(&log);
    let uploader = MemoryUploader::default();
    let paster = paster_with(uploader.clone(), &log);

    let payload = markup(r#"<img src="file:///C:/Users/me/AppData/Local/Temp/clip_image001.png">"#)
        .with_binary_item(png(b"clip"));
    let outcome = paster.paste(&surface, PasteEvent::new(payload)).await;

    assert_eq!(outcome.state, PasteState::Done);
    assert_eq!(outcome.kind, PayloadKind::MarkupWithImages);
    assert!(!outcome.is_degraded());
    assert_eq!(outcome.uploaded_images, 1);
    assert_eq!(
        outcome.media[0].resolved_url.as_deref(),
        Some("https://cdn/x.png")
    );
    assert_eq!(
        surface.content(),
        r#"<p><img class="img-fluid" src="https://cdn/x.png"></p>"#
    );
    assert_eq!(uploader.uploaded(), [png(b"clip")]);
    assert_eq!(
        calls(&log).last().map(String::as_str),
        Some("notify:Success:Paste complete")
    );
}

#[tokio::test]
async fn local_image_without_data_is_dropped() {
    let log = CallLog::default();
    let surface = RecordingSurface::new(&log);
    let uploader = MemoryUploader::default();
    let paster = paster_with(uploader.clone(), &log);

    let payload = markup(r#"<p>Chart:</p><p><img src="C:\Temp\chart.png"></p>"#);
    let outcome = paster.paste(&surface, PasteEvent::new(payload)).await;

    assert_eq!(outcome.state, PasteState::Done);
    assert!(outcome.is_degraded());
    assert_eq!(outcome.dropped_images, 1);
    assert!(outcome.media[0].resolved_url.is_none());
    assert_eq!(surface.content(), "<p>Chart:</p>");
    assert!(uploader.uploaded().is_empty());
}

#[tokio::test]
async fn warning_is_shown_after_insertion() {
    let log = CallLog::default();
    let surface = RecordingSurface::new(&log);
    let paster = paster_with(FailingUploader, &log);

    let payload = markup(r#"<p>Logo <img src="data:image/png;base64,iVBORw0KGgo="></p>"#);
    let outcome = paster.paste(&surface, PasteEvent::new(payload)).await;

    assert_eq!(outcome.dropped_images, 1);
    assert_eq!(surface.content(), "<p>Logo </p>");
    let log = calls(&log);
    let inserted_at = log.iter().position(|c| c == "insert").unwrap();
    let warned_at = log
        .iter()
        .position(|c| c == "notify:Warning:Some images were not pasted")
        .unwrap();
    assert!(warned_at > inserted_at);
}

#[tokio::test]
async fn uploaded_urls_land_in_their_own_images() {
    let log = CallLog::default();
    let surface = RecordingSurface::new(&log);
    let paster = paster_with(EchoUploader, &log);

    let payload = markup(concat!(
        r#"<p>a <img src="file:///C:/Temp/first.png"></p>"#,
        r#"<p>b <img src="https://example.com/keep.png"></p>"#,
        r#"<p>c <img src="data:image/png;base64,aGVsbG8="></p>"#,
        r#"<p>d <img src="file:///C:/Temp/second.png"></p>"#,
    ))
    .with_binary_item(png(b"one"))
    .with_binary_item(png(b"two"));
    let outcome = paster.paste(&surface, PasteEvent::new(payload)).await;

    assert_eq!(outcome.uploaded_images, 3);
    assert!(!outcome.is_degraded());
    assert_eq!(
        surface.content(),
        concat!(
            r#"<p>a <img class="img-fluid" src="https://cdn/one.png"></p>"#,
            r#"<p>b <img class="img-fluid" src="https://example.com/keep.png"></p>"#,
            r#"<p>c <img class="img-fluid" src="https://cdn/hello.png"></p>"#,
            r#"<p>d <img class="img-fluid" src="https://cdn/two.png"></p>"#,
        )
    );
}

#[tokio::test]
async fn surplus_local_images_are_dropped() {
    let log = CallLog::default();
    let surface = RecordingSurface::new(&log);
    let paster = paster_with(EchoUploader, &log);

    let payload = markup(concat!(
        r#"<p>a <img src="file:///C:/Temp/first.png"></p>"#,
        r#"<p>b <img src="file:///C:/Temp/second.png"></p>"#,
    ))
    .with_binary_item(png(b"one"));
    let outcome = paster.paste(&surface, PasteEvent::new(payload)).await;

    assert_eq!(outcome.uploaded_images, 1);
    assert_eq!(outcome.dropped_images, 1);
    assert_eq!(
        surface.content(),
        r#"<p>a <img class="img-fluid" src="https://cdn/one.png"></p><p>b </p>"#
    );
}

#[tokio::test]
async fn images_in_removed_markup_are_not_uploaded() {
    let log = CallLog::default();
    let surface = RecordingSurface::new(&log);
    let uploader = MemoryUploader::default();
    let paster = paster_with(uploader.clone(), &log);

    let payload = markup(r#"<button><img src="data:image/png;base64,YQ=="></button><p>hi</p>"#);
    let outcome = paster.paste(&surface, PasteEvent::new(payload)).await;

    assert_eq!(surface.content(), "<p>hi</p>");
    assert_eq!(outcome.uploaded_images, 0);
    assert!(outcome.media.is_empty());
    assert!(uploader.uploaded().is_empty());
    assert!(!calls(&log).iter().any(|c| c.starts_with("notify:")));
}

#[tokio::test]
async fn removed_markup_does_not_consume_clipboard_items() {
    let log = CallLog::default();
    let surface = RecordingSurface::new(&log);
    let paster = paster_with(EchoUploader, &log);

    let payload = markup(concat!(
        r#"<object><img src="file:///C:/a.png"></object>"#,
        r#"<p><img src="file:///C:/b.png"></p>"#,
    ))
    .with_binary_item(png(b"visible"));
    let outcome = paster.paste(&surface, PasteEvent::new(payload)).await;

    assert!(!outcome.is_degraded());
    assert_eq!(outcome.uploaded_images, 1);
    assert_eq!(
        surface.content(),
        r#"<p><img class="img-fluid" src="https://cdn/visible.png"></p>"#
    );
}

#[tokio::test]
async fn live_clipboard_supplies_missing_images() {
    let log = CallLog::default();
    let surface = RecordingSurface::new(&log);
    let uploader = MemoryUploader::default();
    let paster = paster_with(uploader.clone(), &log);
    let clipboard = LiveClipboard(vec![png(b"live")]);

    let payload = markup(r#"<p><img src="webkit-fake-url://abc/image.tiff"></p>"#);
    let outcome = paster
        .paste(
            &surface,
            PasteEvent::new(payload).with_live_clipboard(&clipboard),
        )
        .await;

    assert_eq!(outcome.uploaded_images, 1);
    assert_eq!(uploader.uploaded(), [png(b"live")]);
    assert!(surface.content().contains(r#"src="https://cdn/x.png""#));
}

#[tokio::test]
async fn emoji_images_paste_as_text() {
    let log = CallLog::default();
    let surface = RecordingSurface::new(&log);
    let uploader = MemoryUploader::default();
    let paster = paster_with(uploader.clone(), &log);

    let payload = markup(
        r#"<p>Great <img class="wlEmoticon wlEmoticon-smile" alt="🙂" src="file:///C:/Temp/smile.png"></p>"#,
    );
    let outcome = paster.paste(&surface, PasteEvent::new(payload)).await;

    assert_eq!(surface.content(), "<p>Great 🙂</p>");
    assert!(outcome.media.is_empty());
    assert!(uploader.uploaded().is_empty());
}

#[tokio::test]
async fn word_export_is_cleaned() {
    let log = CallLog::default();
    let surface = RecordingSurface::new(&log);
    let paster = paster_with(MemoryUploader::default(), &log);

    let html = concat!(
        "<html xmlns:o=\"urn:schemas-microsoft-com:office:office\"><head><style>p.MsoNormal{}</style></head>",
        "<body><!--StartFragment--><div class=\"WordSection1\">",
        "<p class=\"MsoNormal\" style=\"margin:0\"><span style=\"font-family:Calibri\">Quarterly ",
        "<a href=\"https://example.com/report\" style=\"color:blue\">report</a></span><o:p></o:p></p>",
        "<p class=\"MsoNormal\"><o:p>&nbsp;</o:p></p>",
        "</div><!--EndFragment--></body></html>",
    );
    paster
        .paste(&surface, PasteEvent::new(markup(html)))
        .await;

    assert_eq!(
        surface.content(),
        concat!(
            "<p>Quarterly ",
            r#"<a href="https://example.com/report" rel="noopener noreferrer" target="_blank">report</a>"#,
            "</p>"
        )
    );
}

// ---------------------------------------------------------------------------
// End-to-end: other payload kinds
// ---------------------------------------------------------------------------

#[tokio::test]
async fn plain_text_paste() {
    let log = CallLog::default();
    let surface = RecordingSurface::new(&log);
    let paster = paster_with(MemoryUploader::default(), &log);

    let payload = ClipboardPayload::default().with_plain_text("first\n\nsecond <b>");
    let outcome = paster.paste(&surface, PasteEvent::new(payload)).await;

    assert_eq!(outcome.kind, PayloadKind::PlainText);
    assert_eq!(surface.content(), "<p>first</p><p>second &lt;b&gt;</p>");
}

#[tokio::test]
async fn unparseable_markup_falls_back_to_plain_text() {
    let log = CallLog::default();
    let surface = RecordingSurface::new(&log);
    let paster = PasterBuilder::new(MemoryUploader::default())
        .parser(RejectingParser)
        .notifier(RecordingNotifier {
            log: Arc::clone(&log),
        })
        .build();

    let payload = markup("<p>rich</p>").with_plain_text("rich");
    let outcome = paster.paste(&surface, PasteEvent::new(payload)).await;

    assert_eq!(outcome.state, PasteState::Done);
    assert!(outcome.fell_back_to_plain_text);
    assert_eq!(surface.content(), "rich");
    assert!(!calls(&log).iter().any(|c| c.starts_with("notify:")));
}

#[tokio::test]
async fn oversized_markup_falls_back_to_plain_text() {
    let log = CallLog::default();
    let surface = RecordingSurface::new(&log);
    let paster = PasterBuilder::new(MemoryUploader::default())
        .max_markup_bytes(16)
        .build();

    let payload = markup("<p>this markup is far too long</p>").with_plain_text("short");
    let outcome = paster.paste(&surface, PasteEvent::new(payload)).await;

    assert!(outcome.fell_back_to_plain_text);
    assert_eq!(surface.content(), "short");
}

#[tokio::test]
async fn oversized_markup_fallback_is_reported() {
    let log = CallLog::default();
    let surface = RecordingSurface::new(&log);
    let paster = PasterBuilder::new(MemoryUploader::default())
        .max_markup_bytes(16)
        .notifier(RecordingNotifier {
            log: Arc::clone(&log),
        })
        .build();

    let payload = markup("<p>this markup is far too long</p>").with_plain_text("short");
    paster.paste(&surface, PasteEvent::new(payload)).await;

    let log = calls(&log);
    let inserted_at = log.iter().position(|c| c == "insert").unwrap();
    let warned_at = log
        .iter()
        .position(|c| c == "notify:Warning:Formatting was not kept")
        .unwrap();
    assert!(warned_at > inserted_at);
}

#[tokio::test]
async fn deeply_nested_markup_falls_back_to_plain_text() {
    let log = CallLog::default();
    let surface = RecordingSurface::new(&log);
    let paster = paster_with(MemoryUploader::default(), &log);

    let depth = 100_000;
    let html = format!("{}deep{}", "<div>".repeat(depth), "</div>".repeat(depth));
    let payload = markup(&html).with_plain_text("deep");
    let outcome = paster.paste(&surface, PasteEvent::new(payload)).await;

    assert_eq!(outcome.state, PasteState::Done);
    assert!(outcome.fell_back_to_plain_text);
    assert_eq!(surface.content(), "deep");
    assert!(calls(&log)
        .iter()
        .any(|c| c == "notify:Warning:Formatting was not kept"));
}

#[test]
fn sanitizer_survives_deep_nesting() {
    let sanitizer = Sanitizer::default();
    let deep = format!("{}x{}", "<div>".repeat(100_000), "</div>".repeat(100_000));
    assert_eq!(sanitizer.clean_markup(&deep), "");

    let nested = format!("{}x{}", "<div>".repeat(300), "</div>".repeat(300));
    assert_eq!(sanitizer.clean_markup(&nested), "<p>x</p>");
}

#[tokio::test]
async fn image_only_paste_uploads_the_item() {
    let log = CallLog::default();
    let surface = RecordingSurface::new(&log);
    let uploader = MemoryUploader::default();
    let paster = paster_with(uploader.clone(), &log);

    let payload = ClipboardPayload::default().with_binary_item(png(b"screenshot"));
    let outcome = paster.paste(&surface, PasteEvent::new(payload)).await;

    assert_eq!(outcome.kind, PayloadKind::ImageOnly);
    assert_eq!(outcome.uploaded_images, 1);
    assert_eq!(uploader.uploaded(), [png(b"screenshot")]);
    assert_eq!(
        surface.content(),
        r#"<p><img class="img-fluid" src="https://cdn/x.png"></p>"#
    );
}

#[tokio::test]
async fn failed_image_only_paste_inserts_nothing() {
    let log = CallLog::default();
    let surface = RecordingSurface::new(&log);
    let paster = paster_with(FailingUploader, &log);

    let payload = ClipboardPayload::default().with_binary_item(png(b"screenshot"));
    let outcome = paster.paste(&surface, PasteEvent::new(payload)).await;

    assert_eq!(outcome.state, PasteState::Done);
    assert!(outcome.inserted.is_none());
    assert!(!calls(&log).iter().any(|c| c == "insert" || c == "delete_selected"));
    assert!(calls(&log)
        .iter()
        .any(|c| c == "notify:Warning:Some images were not pasted"));
}

#[tokio::test]
async fn empty_payload_does_nothing() {
    let log = CallLog::default();
    let surface = RecordingSurface::new(&log);
    let paster = paster_with(MemoryUploader::default(), &log);

    let outcome = paster
        .paste(&surface, PasteEvent::new(ClipboardPayload::default()))
        .await;

    assert_eq!(outcome.state, PasteState::Done);
    assert_eq!(outcome.kind, PayloadKind::Empty);
    assert_eq!(calls(&log), ["save_selection"]);
}

// ---------------------------------------------------------------------------
// Cancellation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn cancel_before_paste_aborts() {
    let log = CallLog::default();
    let surface = RecordingSurface::new(&log);
    let paster = paster_with(MemoryUploader::default(), &log);
    let (handle, signal) = cancel_pair();
    handle.cancel();

    let outcome = paster
        .paste(
            &surface,
            PasteEvent::new(markup("<p>x</p>")).with_cancel(signal),
        )
        .await;

    assert_eq!(outcome.state, PasteState::Aborted);
    assert!(outcome.inserted.is_none());
    assert_eq!(calls(&log), ["save_selection"]);
}

#[tokio::test]
async fn cancel_during_upload_aborts_without_inserting() {
    let log = CallLog::default();
    let surface = RecordingSurface::new(&log);
    let paster = paster_with(StalledUploader, &log);
    let (handle, signal) = cancel_pair();

    let payload = markup(r#"<p>x <img src="data:image/png;base64,YQ=="></p>"#);
    let paste = paster.paste(&surface, PasteEvent::new(payload).with_cancel(signal));
    let cancel = async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        handle.cancel();
    };

    let (outcome, ()) = tokio::time::timeout(Duration::from_secs(5), async {
        tokio::join!(paste, cancel)
    })
    .await
    .expect("cancellation should end the paste");

    assert_eq!(outcome.state, PasteState::Aborted);
    assert!(surface.content().is_empty());
    assert_eq!(calls(&log), ["save_selection"]);
}

#[tokio::test]
async fn dropped_handle_does_not_cancel() {
    let log = CallLog::default();
    let surface = RecordingSurface::new(&log);
    let paster = paster_with(MemoryUploader::default(), &log);
    let (handle, signal) = cancel_pair();
    drop(handle);

    let payload = markup(r#"<p>x <img src="data:image/png;base64,YQ=="></p>"#);
    let outcome = paster
        .paste(&surface, PasteEvent::new(payload).with_cancel(signal))
        .await;

    assert_eq!(outcome.state, PasteState::Done);
    assert_eq!(outcome.uploaded_images, 1);
}

// ---------------------------------------------------------------------------
// Storage-backed uploads
// ---------------------------------------------------------------------------

#[tokio::test]
async fn paste_stores_images_on_disk() {
    let tmp = TempDir::new().unwrap();
    let log = CallLog::default();
    let surface = RecordingSurface::new(&log);
    let uploader =
        StorageUploader::new(FsStorage::new(tmp.path()), "https://example.com/u").prefix("paste");
    let paster = paster_with(uploader, &log);

    let payload = markup(r#"<p><img alt="dot" src="data:image/gif;base64,R0lGODlhAQABAAAAACw="></p>"#);
    let outcome = paster.paste(&surface, PasteEvent::new(payload)).await;

    let url = outcome.media[0].resolved_url.clone().unwrap();
    let key = url.strip_prefix("https://example.com/u/").unwrap();
    assert!(key.starts_with("paste/") && key.ends_with(".gif"));
    let stored = tokio::fs::read(tmp.path().join(key)).await.unwrap();
    assert!(stored.starts_with(b"GIF89a"));
    assert!(surface.content().contains(&format!(r#"src="{url}""#)));
    assert!(surface.content().contains(r#"alt="dot""#));
}

#[tokio::test]
async fn fs_storage_put_creates_directories() {
    let tmp = TempDir::new().unwrap();
    let storage = FsStorage::new(tmp.path());

    storage
        .put("deep/nested/dir/image.png", &BinaryBlob::new("image/png", b"png".to_vec()))
        .await
        .unwrap();

    let content = tokio::fs::read(tmp.path().join("deep/nested/dir/image.png"))
        .await
        .unwrap();
    assert_eq!(content, b"png");
}

#[tokio::test]
async fn fs_storage_overwrites_existing_key() {
    let tmp = TempDir::new().unwrap();
    let storage = FsStorage::new(tmp.path());

    let blob = |bytes: &[u8]| BinaryBlob::new("image/png", bytes.to_vec());
    storage.put("a.png", &blob(b"first")).await.unwrap();
    storage.put("a.png", &blob(b"second")).await.unwrap();

    let content = tokio::fs::read(tmp.path().join("a.png")).await.unwrap();
    assert_eq!(content, b"second");
}
