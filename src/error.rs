//! Error types for the `paste_sanitizer` crate.

/// All errors that collaborators and helpers can report.
///
/// None of these abort a paste: the orchestrator downgrades every one of them
/// to a degraded outcome.
#[derive(Debug, thiserror::Error)]
pub enum PasteError {
    /// The uploader or its storage backend failed to persist a blob.
    #[error("Upload failed: {0}")]
    Upload(Box<dyn std::error::Error + Send + Sync>),

    /// The live clipboard could not be read. Returned by host
    /// [`ClipboardReader`](crate::ClipboardReader) implementations.
    #[error("Clipboard read failed: {0}")]
    ClipboardRead(String),

    /// The markup payload exceeds the configured size limit.
    #[error("Markup payload too large: {size} bytes (limit {limit})")]
    MarkupTooLarge { size: usize, limit: usize },

    /// The markup payload nests elements deeper than the parser accepts.
    #[error("Markup payload nests deeper than {limit} levels")]
    MarkupTooDeep { limit: usize },

    /// The markup payload produced no content at all.
    #[error("Markup payload contained no content")]
    EmptyMarkup,
}

impl PasteError {
    /// `true` for markup that was rejected because of its size or shape
    /// rather than because it was empty.
    pub fn is_markup_limit(&self) -> bool {
        matches!(
            self,
            PasteError::MarkupTooLarge { .. } | PasteError::MarkupTooDeep { .. }
        )
    }
}

/// A type alias for `Result<T, PasteError>`.
pub type Result<T> = std::result::Result<T, PasteError>;
