//! Builder for configuring a [`Paster`].

use crate::markup::{DEFAULT_MAX_MARKUP_BYTES, HtmlMarkup, MarkupParser};
use crate::media::Uploader;
use crate::paste::{Notifier, Paster, TracingNotifier};
use crate::sanitizer::{Decorations, Sanitizer};

/// Builder for configuring a [`Paster`].
///
/// Provides a fluent API for the markup size limit, the presentational
/// defaults synthesized on kept elements, the notifier and the parser.
///
/// # Example
///
/// ```rust,no_run
/// use paste_sanitizer::{BinaryBlob, PasterBuilder, Result, TracingNotifier, Uploader};
///
/// # struct Cdn;
/// # impl Uploader for Cdn {
/// #     async fn upload(&self, _blob: BinaryBlob) -> Result<String> { Ok(String::new()) }
/// # }
/// let paster = PasterBuilder::new(Cdn)
///     .max_markup_bytes(1024 * 1024)
///     .table_class(Some("table"))
///     .image_class(None)
///     .notifier(TracingNotifier)
///     .build();
/// ```
pub struct PasterBuilder<U: Uploader> {
    uploader: U,
    decorations: Decorations,
    max_markup_bytes: usize,
    parser: Option<Box<dyn MarkupParser>>,
    notifier: Box<dyn Notifier>,
}

impl<U: Uploader> PasterBuilder<U> {
    /// Create a new builder around the given uploader with sensible defaults.
    ///
    /// Defaults: 4 MiB markup limit, [`Decorations::default`], the `scraper`
    /// backed [`HtmlMarkup`] parser and a [`TracingNotifier`].
    pub fn new(uploader: U) -> Self {
        Self {
            uploader,
            decorations: Decorations::default(),
            max_markup_bytes: DEFAULT_MAX_MARKUP_BYTES,
            parser: None,
            notifier: Box::new(TracingNotifier),
        }
    }

    /// Markup payloads above this size are treated as unparseable and the
    /// paste falls back to plain text. Ignored when a custom parser is set.
    pub fn max_markup_bytes(mut self, limit: usize) -> Self {
        self.max_markup_bytes = limit;
        self
    }

    /// Replace every presentational default at once.
    pub fn decorations(mut self, decorations: Decorations) -> Self {
        self.decorations = decorations;
        self
    }

    pub fn table_class(mut self, class: Option<&str>) -> Self {
        self.decorations.table_class = class.map(str::to_string);
        self
    }

    pub fn image_class(mut self, class: Option<&str>) -> Self {
        self.decorations.image_class = class.map(str::to_string);
        self
    }

    pub fn quote_class(mut self, class: Option<&str>) -> Self {
        self.decorations.quote_class = class.map(str::to_string);
        self
    }

    pub fn code_class(mut self, class: Option<&str>) -> Self {
        self.decorations.code_class = class.map(str::to_string);
        self
    }

    pub fn inline_code_class(mut self, class: Option<&str>) -> Self {
        self.decorations.inline_code_class = class.map(str::to_string);
        self
    }

    pub fn list_class(mut self, class: Option<&str>) -> Self {
        self.decorations.list_class = class.map(str::to_string);
        self
    }

    /// `target` and `rel` synthesized on links that have an `href`.
    pub fn link_attributes(mut self, target: Option<&str>, rel: Option<&str>) -> Self {
        self.decorations.link_target = target.map(str::to_string);
        self.decorations.link_rel = rel.map(str::to_string);
        self
    }

    /// Use a custom [`MarkupParser`] instead of [`HtmlMarkup`].
    pub fn parser(mut self, parser: impl MarkupParser + 'static) -> Self {
        self.parser = Some(Box::new(parser));
        self
    }

    /// Where user-facing messages go.
    pub fn notifier(mut self, notifier: impl Notifier + 'static) -> Self {
        self.notifier = Box::new(notifier);
        self
    }

    /// Consume the builder and return the configured [`Paster`].
    pub fn build(self) -> Paster<U> {
        let parser = self
            .parser
            .unwrap_or_else(|| Box::new(HtmlMarkup::new(self.max_markup_bytes)));
        Paster::new(
            self.uploader,
            Sanitizer::new(self.decorations),
            parser,
            self.notifier,
        )
    }
}
