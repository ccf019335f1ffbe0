//! The paste state machine.

use crate::markup::{MarkupParser, serialize};
use crate::media::{
    ClipboardReader, MediaReference, MediaScan, MediaSources, Uploader, resolve_media, scan,
    scan_image_item,
};
use crate::node::ContentNode;
use crate::paste::{
    CancelSignal, ClipboardPayload, EditableSurface, NotifyLevel, Notifier, PasteEvent,
    PasteOutcome, PasteState, PayloadKind, plain_text_nodes,
};
use crate::sanitizer::{Sanitizer, normalize};

/// Drives clipboard pastes into an editable surface.
///
/// Created with [`PasterBuilder`](crate::PasterBuilder). A single `Paster`
/// can serve any number of pastes, including overlapping ones; each call to
/// [`paste`](Self::paste) owns its own context.
pub struct Paster<U: Uploader> {
    uploader: U,
    sanitizer: Sanitizer,
    parser: Box<dyn MarkupParser>,
    notifier: Box<dyn Notifier>,
}

/// Per-paste state: the saved selection, the classified payload and the
/// media references queued for this paste.
struct PasteContext<H> {
    selection: H,
    state: PasteState,
    kind: PayloadKind,
    media: Vec<MediaReference>,
    uploaded: usize,
    dropped: usize,
    fell_back: bool,
    /// The fallback was forced by markup size or nesting limits.
    hit_markup_limit: bool,
}

impl<H> PasteContext<H> {
    fn new(selection: H) -> Self {
        Self {
            selection,
            state: PasteState::Idle,
            kind: PayloadKind::Empty,
            media: Vec::new(),
            uploaded: 0,
            dropped: 0,
            fell_back: false,
            hit_markup_limit: false,
        }
    }

    fn advance(&mut self, next: PasteState) {
        tracing::debug!("Paste state {} -> {}", self.state, next);
        self.state = next;
    }

    fn finish(mut self, state: PasteState, inserted: Option<String>) -> PasteOutcome {
        self.advance(state);
        PasteOutcome {
            state,
            kind: self.kind,
            inserted,
            media: self.media,
            uploaded_images: self.uploaded,
            dropped_images: self.dropped,
            fell_back_to_plain_text: self.fell_back,
        }
    }
}

fn is_cancelled(cancel: &Option<CancelSignal>) -> bool {
    cancel.as_ref().is_some_and(CancelSignal::is_cancelled)
}

impl<U: Uploader> Paster<U> {
    pub(crate) fn new(
        uploader: U,
        sanitizer: Sanitizer,
        parser: Box<dyn MarkupParser>,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        Self {
            uploader,
            sanitizer,
            parser,
            notifier,
        }
    }

    pub fn sanitizer(&self) -> &Sanitizer {
        &self.sanitizer
    }

    pub fn uploader(&self) -> &U {
        &self.uploader
    }

    /// Run one paste to completion.
    ///
    /// Never fails: unresolvable images are dropped and reported through the
    /// notifier after insertion, unparseable markup falls back to the plain
    /// text of the same event, and cancellation ends in
    /// [`PasteState::Aborted`] with nothing inserted.
    pub async fn paste<S, C>(&self, surface: &S, event: PasteEvent<'_, C>) -> PasteOutcome
    where
        S: EditableSurface,
        C: ClipboardReader,
    {
        let PasteEvent {
            payload,
            live_clipboard,
            mut cancel,
        } = event;

        let mut ctx = PasteContext::new(surface.save_selection());
        if is_cancelled(&cancel) {
            return ctx.finish(PasteState::Aborted, None);
        }

        ctx.advance(PasteState::Classifying);
        ctx.kind = payload.kind();
        tracing::debug!("Classified paste payload as {:?}", ctx.kind);

        let sources = MediaSources::from_parts(&payload.binary_items, live_clipboard);
        let nodes = match ctx.kind {
            PayloadKind::Empty => return ctx.finish(PasteState::Done, None),
            PayloadKind::PlainText => plain_text(&payload),
            PayloadKind::ImageOnly => {
                let Some(blob) = payload.binary_items.iter().find(|b| b.is_image()) else {
                    return ctx.finish(PasteState::Done, None);
                };
                let scanned = scan_image_item(blob.clone());
                match self.sanitize(&mut ctx, scanned, &sources, &mut cancel).await {
                    Some(nodes) => nodes,
                    None => return ctx.finish(PasteState::Aborted, None),
                }
            }
            PayloadKind::Markup | PayloadKind::MarkupWithImages => {
                let markup = payload.markup.as_deref().unwrap_or_default();
                match self.parser.parse(markup) {
                    Ok(parsed) => {
                        match self
                            .sanitize(&mut ctx, scan(parsed), &sources, &mut cancel)
                            .await
                        {
                            Some(nodes) => nodes,
                            None => return ctx.finish(PasteState::Aborted, None),
                        }
                    }
                    Err(e) => {
                        tracing::warn!("Falling back to plain text paste: {e}");
                        ctx.fell_back = true;
                        ctx.hit_markup_limit = e.is_markup_limit();
                        plain_text(&payload)
                    }
                }
            }
        };

        if is_cancelled(&cancel) {
            return ctx.finish(PasteState::Aborted, None);
        }

        ctx.advance(PasteState::Inserting);
        let inserted = self.insert(surface, &ctx.selection, &nodes);
        let hit_markup_limit = ctx.hit_markup_limit;
        let outcome = ctx.finish(PasteState::Done, inserted);
        self.report(&outcome, hit_markup_limit);
        outcome
    }

    /// `ResolvingMedia → Rewriting → Normalizing`. Returns `None` if the
    /// paste was cancelled while media was resolving.
    async fn sanitize<H, C: ClipboardReader>(
        &self,
        ctx: &mut PasteContext<H>,
        scanned: MediaScan,
        sources: &MediaSources<'_, C>,
        cancel: &mut Option<CancelSignal>,
    ) -> Option<Vec<ContentNode>> {
        ctx.advance(PasteState::ResolvingMedia);
        let resolving = resolve_media(scanned, &self.uploader, sources);
        let resolution = match cancel.as_mut() {
            Some(signal) => tokio::select! {
                biased;

                _ = signal.cancelled() => {
                    tracing::info!("Paste cancelled while resolving media");
                    return None;
                }

                resolution = resolving => resolution,
            },
            None => resolving.await,
        };

        ctx.uploaded = resolution.uploaded;
        ctx.dropped = resolution.unresolved;
        ctx.media = resolution.references;

        ctx.advance(PasteState::Rewriting);
        let rewritten = self.sanitizer.rewrite(resolution.nodes);

        ctx.advance(PasteState::Normalizing);
        Some(normalize(rewritten))
    }

    fn insert<S: EditableSurface>(
        &self,
        surface: &S,
        selection: &S::Selection,
        nodes: &[ContentNode],
    ) -> Option<String> {
        if nodes.is_empty() {
            tracing::debug!("Nothing left to insert");
            return None;
        }
        let content = serialize(nodes);
        surface.restore_selection(selection);
        surface.delete_selected_content();
        surface.insert_at(&content);
        surface.focus();
        Some(content)
    }

    fn report(&self, outcome: &PasteOutcome, hit_markup_limit: bool) {
        if hit_markup_limit {
            self.notifier.notify(
                NotifyLevel::Warning,
                "Formatting was not kept",
                "The copied content was too large or too deeply nested to keep its formatting.",
            );
        } else if outcome.dropped_images > 0 {
            let noun = if outcome.dropped_images == 1 { "image" } else { "images" };
            self.notifier.notify(
                NotifyLevel::Warning,
                "Some images were not pasted",
                &format!(
                    "{} {noun} could not be uploaded and {} removed.",
                    outcome.dropped_images,
                    if outcome.dropped_images == 1 { "was" } else { "were" },
                ),
            );
        } else if outcome.uploaded_images > 0 {
            let noun = if outcome.uploaded_images == 1 { "image" } else { "images" };
            self.notifier.notify(
                NotifyLevel::Success,
                "Paste complete",
                &format!("Pasted with {} {noun}.", outcome.uploaded_images),
            );
        }
    }
}

fn plain_text(payload: &ClipboardPayload) -> Vec<ContentNode> {
    plain_text_nodes(payload.plain_text.as_deref().unwrap_or_default())
}
