//! Detection and resolution of pasted images that cannot be referenced as-is.
//!
//! Images pasted from office tools and other pages often point at the user's
//! filesystem or embed their bytes inline. Neither may survive into stored
//! content, so the pipeline:
//!
//! 1. [`scan`] tags every such image with a stable id and a placeholder
//!    `src`, turning decorative clip artifacts into their text fallback;
//! 2. [`resolve_media`] uploads the available payloads concurrently and,
//!    once every upload has settled, commits the returned URLs back into the
//!    tagged nodes.
//!
//! Images left with a placeholder are dropped by the rewriter.

mod resolve;
mod scan;

pub use resolve::{MediaResolution, MediaSources, resolve_media};
pub use scan::{MediaScan, scan, scan_image_item};

use std::fmt;
use std::future::Future;
use std::sync::LazyLock;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use regex::Regex;

use crate::error::Result;
use crate::node::Element;

/// `src` written into images that are waiting on an upload.
pub const PLACEHOLDER_SRC: &str = "about:blank#paste-pending";

/// Attribute carrying the [`MediaId`] of a queued image between scan and
/// commit. It is not in any allow-list, so it never reaches the output.
pub const MEDIA_ID_ATTR: &str = "data-paste-media-id";

static LOCAL_SCHEME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:file|webkit-fake-url|cid|blob|ms-appx|ms-appdata|x-apple-ql-id):")
        .expect("LOCAL_SCHEME_RE: hardcoded regex is valid")
});

// C:\..., C:/..., and UNC \\server\share paths
static LOCAL_PATH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[A-Za-z]:[\\/]|\\\\)").expect("LOCAL_PATH_RE: hardcoded regex is valid")
});

/// Captures: (1) MIME type, (2) parameters, (3) payload
static DATA_URI_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)^data:([^;,]*)((?:;[^;,]*)*),(.*)$")
        .expect("DATA_URI_RE: hardcoded regex is valid")
});

/// How an image reference was classified at scan time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MediaKind {
    /// Points at the user's filesystem; never dereferenced.
    LocalPath,
    /// Carries its bytes inline as a data URI.
    EmbeddedData,
    /// Decorative emoji/icon image with a text fallback.
    ClipArtifact,
}

/// Stable per-node identifier assigned at scan time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MediaId(pub u32);

impl fmt::Display for MediaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Binary image data with its MIME type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BinaryBlob {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl BinaryBlob {
    pub fn new(mime_type: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            mime_type: mime_type.into(),
            bytes: bytes.into(),
        }
    }

    pub fn is_image(&self) -> bool {
        self.essence().starts_with("image/")
    }

    /// Lowercased MIME type without parameters (`image/png; x=y` gives
    /// `image/png`).
    pub fn essence(&self) -> String {
        self.mime_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase()
    }

    /// File extension for the image type, `bin` when it is not a known one.
    pub fn extension(&self) -> &'static str {
        match self.essence().as_str() {
            "image/png" => "png",
            "image/jpeg" | "image/jpg" | "image/pjpeg" => "jpg",
            "image/gif" => "gif",
            "image/webp" => "webp",
            "image/bmp" | "image/x-ms-bmp" => "bmp",
            "image/svg+xml" => "svg",
            "image/tiff" => "tiff",
            _ => "bin",
        }
    }
}

/// An image queued for resolution.
#[derive(Clone, Debug)]
pub struct MediaReference {
    pub id: MediaId,
    pub original_value: String,
    pub kind: MediaKind,
    pub resolved_url: Option<String>,
    pub(crate) payload: Option<BinaryBlob>,
}

impl MediaReference {
    /// Whether bytes are available for this reference without touching the
    /// clipboard.
    pub fn has_payload(&self) -> bool {
        self.payload.is_some()
    }
}

/// Upload service that turns a blob into a remote URL.
///
/// One call is made per queued image. Retry and timeout policy belong to the
/// implementation.
///
/// ```rust,no_run
/// use paste_sanitizer::{BinaryBlob, Result, Uploader};
///
/// struct Cdn;
///
/// impl Uploader for Cdn {
///     async fn upload(&self, blob: BinaryBlob) -> Result<String> {
///         Ok(format!("https://cdn.example.com/{}", blob.bytes.len()))
///     }
/// }
/// ```
pub trait Uploader: Send + Sync {
    fn upload(&self, blob: BinaryBlob) -> impl Future<Output = Result<String>> + Send;
}

/// Host capability to read binary items from the live clipboard.
///
/// Only usable inside the user-gesture turn of the paste event.
pub trait ClipboardReader: Send + Sync {
    fn read_images(&self) -> impl Future<Output = Result<Vec<BinaryBlob>>> + Send;
}

/// Marker for hosts without a live clipboard read capability.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoClipboardAccess;

impl ClipboardReader for NoClipboardAccess {
    async fn read_images(&self) -> Result<Vec<BinaryBlob>> {
        Ok(Vec::new())
    }
}

/// Classify a `src`-like value. `None` means an ordinary network or relative
/// URL that can be kept as-is.
pub fn classify_src(value: &str) -> Option<MediaKind> {
    let value = value.trim();
    if DATA_URI_RE.is_match(value) {
        Some(MediaKind::EmbeddedData)
    } else if LOCAL_SCHEME_RE.is_match(value) || LOCAL_PATH_RE.is_match(value) {
        Some(MediaKind::LocalPath)
    } else {
        None
    }
}

/// Classify an image-bearing element, taking clip artifacts into account.
pub fn classify_image(el: &Element) -> Option<MediaKind> {
    if clip_fallback(el).is_some() {
        return Some(MediaKind::ClipArtifact);
    }
    classify_src(el.attr("src").unwrap_or_default())
}

/// Text that replaces a decorative emoji/icon image, if `el` is one.
pub fn clip_fallback(el: &Element) -> Option<String> {
    if let Some(ch) = el.attr("data-emoji-char").filter(|c| !c.trim().is_empty()) {
        return Some(ch.trim().to_string());
    }

    let alt = el.attr("alt").map(str::trim).filter(|a| !a.is_empty())?;
    let class = el.attr("class").unwrap_or_default().to_ascii_lowercase();
    let is_glyph = class
        .split_ascii_whitespace()
        .any(|token| token.contains("emoji") || token.contains("emoticon"));
    is_glyph.then(|| alt.to_string())
}

/// `true` if an image with this `src` must not be kept: empty, still the
/// placeholder, or a local/embedded reference nobody resolved.
pub fn is_unresolved_src(src: &str) -> bool {
    let src = src.trim();
    src.is_empty() || src == PLACEHOLDER_SRC || classify_src(src).is_some()
}

/// Decode a base64 image data URI into a blob.
///
/// Returns `None` for non-image MIME types, non-base64 encodings and
/// malformed payloads; such references fall back to clipboard correlation.
pub fn decode_data_uri(value: &str) -> Option<BinaryBlob> {
    let caps = DATA_URI_RE.captures(value.trim())?;
    let mime = caps.get(1).map_or("", |m| m.as_str()).trim();
    let params = caps.get(2).map_or("", |m| m.as_str()).to_ascii_lowercase();
    let payload = caps.get(3).map_or("", |m| m.as_str());

    if !params.split(';').any(|p| p.trim() == "base64") {
        tracing::debug!("Skipping non-base64 data URI ({mime})");
        return None;
    }

    let blob = BinaryBlob::new(mime.to_ascii_lowercase(), Vec::new());
    if !blob.is_image() {
        tracing::debug!("Skipping data URI with non-image type {mime:?}");
        return None;
    }

    let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    match STANDARD.decode(compact.as_bytes()) {
        Ok(bytes) => Some(BinaryBlob { bytes, ..blob }),
        Err(e) => {
            tracing::debug!("Failed to decode data URI payload: {e}");
            None
        }
    }
}
