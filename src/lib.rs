//! # paste_sanitizer
//!
//! Turns whatever a user pastes into a rich-text editor into clean,
//! policy-conformant content, and uploads the images it carries.
//!
//! ## Overview
//!
//! A [`Paster`] drives one clipboard paste at a time through a small state
//! machine:
//!
//! 1. the payload is classified (image only, markup, plain text, empty);
//! 2. markup is parsed, and images pointing at local files or embedding their
//!    bytes are tagged and uploaded concurrently through your [`Uploader`];
//! 3. the tree is rewritten against a fixed tag and attribute policy;
//! 4. the result is normalized (redundant wrappers flattened, stray inline
//!    runs grouped into paragraphs, double line breaks split, empty nodes
//!    pruned);
//! 5. the serialized content is inserted into your [`EditableSurface`].
//!
//! The cleanup steps are also available on their own through [`Sanitizer`].
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use paste_sanitizer::{ClipboardPayload, FsStorage, PasteEvent, PasterBuilder, StorageUploader};
//! # use paste_sanitizer::EditableSurface;
//! # struct Editor;
//! # impl EditableSurface for Editor {
//! #     type Selection = ();
//! #     fn save_selection(&self) {}
//! #     fn restore_selection(&self, _: &()) {}
//! #     fn delete_selected_content(&self) {}
//! #     fn insert_at(&self, _: &str) {}
//! #     fn focus(&self) {}
//! # }
//!
//! # async fn example(editor: Editor) {
//! let uploader = StorageUploader::new(FsStorage::new("/var/www/uploads"), "https://example.com/uploads");
//! let paster = PasterBuilder::new(uploader)
//!     .table_class(Some("table"))
//!     .build();
//!
//! let payload = ClipboardPayload::default()
//!     .with_markup(r#"<div><span style="color:red">Hello</span></div>"#)
//!     .with_plain_text("Hello");
//! let outcome = paster.paste(&editor, PasteEvent::new(payload)).await;
//! assert_eq!(outcome.inserted.as_deref(), Some("<p>Hello</p>"));
//! # }
//! ```
//!
//! ## Feature flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `s3` | **yes** | Enables [`S3Storage`] and re-exports from `aws-sdk-s3` / `aws-config`. |
//! | `rustls-tls` | no | Use `rustls` instead of the platform TLS for the AWS SDK. |

pub mod config;
pub mod error;
pub mod markup;
pub mod media;
pub mod node;
pub mod paste;
pub mod sanitizer;
pub mod storage;

pub use config::PasterBuilder;
pub use error::{PasteError, Result};
pub use markup::{HtmlMarkup, MarkupParser, serialize};
pub use media::{
    BinaryBlob, ClipboardReader, MediaId, MediaKind, MediaReference, NoClipboardAccess, Uploader,
};
pub use node::{ContentNode, Element};
pub use paste::{
    CancelHandle, CancelSignal, ClipboardPayload, EditableSurface, NotifyLevel, Notifier,
    PasteEvent, PasteOutcome, PasteState, Paster, PayloadKind, TracingNotifier, cancel_pair,
};
pub use sanitizer::{Decorations, Sanitizer};
#[cfg(feature = "s3")]
pub use storage::{
    Credentials, IMMUTABLE_CACHE_CONTROL, Region, S3Client, S3Config, S3ConfigBuilder, S3Storage,
};
pub use storage::{FsStorage, Storage, StorageUploader};
