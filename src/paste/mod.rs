//! Paste-event orchestration.
//!
//! One [`Paster::paste`] call drives one clipboard paste through
//! `Idle → Classifying → ResolvingMedia → Rewriting → Normalizing →
//! Inserting → Done`, with [`PasteState::Aborted`] reachable whenever the
//! host cancels. Every paste owns its own context and tree; concurrent
//! pastes do not share state.

mod cancel;
mod orchestrator;
mod surface;

pub use cancel::{CancelHandle, CancelSignal, cancel_pair};
pub use orchestrator::Paster;
pub use surface::{EditableSurface, NotifyLevel, Notifier, TracingNotifier};

use std::fmt;

use crate::media::{BinaryBlob, ClipboardReader, MediaReference, NoClipboardAccess};
use crate::node::{ContentNode, Element};

/// Lifecycle of a single paste.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PasteState {
    Idle,
    Classifying,
    ResolvingMedia,
    Rewriting,
    Normalizing,
    Inserting,
    Done,
    Aborted,
}

impl fmt::Display for PasteState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// What the clipboard carried.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PayloadKind {
    /// Binary image items and no markup.
    ImageOnly,
    /// Markup alongside binary image items.
    MarkupWithImages,
    Markup,
    PlainText,
    Empty,
}

/// The data a paste event exposes.
#[derive(Clone, Debug, Default)]
pub struct ClipboardPayload {
    pub binary_items: Vec<BinaryBlob>,
    pub markup: Option<String>,
    pub plain_text: Option<String>,
}

impl ClipboardPayload {
    pub fn with_markup(mut self, markup: impl Into<String>) -> Self {
        self.markup = Some(markup.into());
        self
    }

    pub fn with_plain_text(mut self, text: impl Into<String>) -> Self {
        self.plain_text = Some(text.into());
        self
    }

    pub fn with_binary_item(mut self, item: BinaryBlob) -> Self {
        self.binary_items.push(item);
        self
    }

    pub fn kind(&self) -> PayloadKind {
        let has_images = self.binary_items.iter().any(BinaryBlob::is_image);
        let has_markup = self.markup.as_deref().is_some_and(|m| !m.trim().is_empty());
        let has_text = self.plain_text.as_deref().is_some_and(|t| !t.trim().is_empty());
        match (has_markup, has_images) {
            (true, true) => PayloadKind::MarkupWithImages,
            (true, false) => PayloadKind::Markup,
            (false, true) => PayloadKind::ImageOnly,
            (false, false) if has_text => PayloadKind::PlainText,
            (false, false) => PayloadKind::Empty,
        }
    }
}

/// A paste event handed to [`Paster::paste`]: the payload, an optional live
/// clipboard read capability and an optional cancellation signal.
pub struct PasteEvent<'a, C = NoClipboardAccess> {
    pub(crate) payload: ClipboardPayload,
    pub(crate) live_clipboard: Option<&'a C>,
    pub(crate) cancel: Option<CancelSignal>,
}

impl PasteEvent<'static, NoClipboardAccess> {
    pub fn new(payload: ClipboardPayload) -> Self {
        Self {
            payload,
            live_clipboard: None,
            cancel: None,
        }
    }
}

impl<'a, C: ClipboardReader> PasteEvent<'a, C> {
    /// Allow payload-less images to be read from the live clipboard.
    pub fn with_live_clipboard<'b, R: ClipboardReader>(self, reader: &'b R) -> PasteEvent<'b, R> {
        PasteEvent {
            payload: self.payload,
            live_clipboard: Some(reader),
            cancel: self.cancel,
        }
    }

    pub fn with_cancel(mut self, signal: CancelSignal) -> Self {
        self.cancel = Some(signal);
        self
    }
}

/// How a paste ended.
#[derive(Debug)]
pub struct PasteOutcome {
    pub state: PasteState,
    pub kind: PayloadKind,
    /// Serialized content handed to the surface, if anything was inserted.
    pub inserted: Option<String>,
    pub media: Vec<MediaReference>,
    pub uploaded_images: usize,
    pub dropped_images: usize,
    pub fell_back_to_plain_text: bool,
}

impl PasteOutcome {
    /// `true` when the paste landed but some images were dropped.
    pub fn is_degraded(&self) -> bool {
        self.dropped_images > 0
    }
}

/// Turn plain text into content: one paragraph per non-empty line, or a bare
/// text run when there is a single line.
pub fn plain_text_nodes(text: &str) -> Vec<ContentNode> {
    let lines: Vec<&str> = text.lines().filter(|line| !line.trim().is_empty()).collect();
    if let &[single] = lines.as_slice() {
        return vec![ContentNode::text(single)];
    }
    lines
        .into_iter()
        .map(|line| {
            Element::new("p")
                .with_children(vec![ContentNode::text(line)])
                .into()
        })
        .collect()
}
