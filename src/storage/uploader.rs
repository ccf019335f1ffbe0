//! [`Uploader`] backed by a [`Storage`].

use uuid::Uuid;

use crate::error::Result;
use crate::media::{BinaryBlob, Uploader};
use crate::storage::Storage;

/// Writes each pasted image to a [`Storage`] under `{prefix}/{uuid}.{ext}`
/// and returns `{public_base_url}/{key}` as the image URL.
///
/// # Example
///
/// ```rust,no_run
/// use paste_sanitizer::{FsStorage, PasterBuilder, StorageUploader};
///
/// let uploader = StorageUploader::new(
///     FsStorage::new("/var/www/uploads"),
///     "https://example.com/uploads",
/// )
/// .prefix("pasted");
/// let paster = PasterBuilder::new(uploader).build();
/// ```
pub struct StorageUploader<S: Storage> {
    storage: S,
    public_base_url: String,
    prefix: String,
}

impl<S: Storage> StorageUploader<S> {
    pub fn new(storage: S, public_base_url: impl Into<String>) -> Self {
        Self {
            storage,
            public_base_url: public_base_url.into(),
            prefix: String::new(),
        }
    }

    /// Key prefix for stored images. Leading and trailing slashes are ignored.
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into().trim_matches('/').to_string();
        self
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn key_for(&self, blob: &BinaryBlob) -> String {
        let name = format!("{}.{}", Uuid::new_v4(), blob.extension());
        if self.prefix.is_empty() {
            name
        } else {
            format!("{}/{name}", self.prefix)
        }
    }
}

impl<S: Storage> Uploader for StorageUploader<S> {
    async fn upload(&self, blob: BinaryBlob) -> Result<String> {
        let key = self.key_for(&blob);
        self.storage.put(&key, &blob).await?;
        tracing::debug!(key = %key, mime = %blob.mime_type, "Stored pasted image");
        Ok(format!("{}/{key}", self.public_base_url.trim_end_matches('/')))
    }
}
