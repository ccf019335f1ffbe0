//! Filesystem storage backend.

use std::path::PathBuf;

use crate::error::{PasteError, Result};
use crate::media::BinaryBlob;
use crate::storage::Storage;

/// Storage backend that writes uploaded images to the local filesystem.
///
/// Intermediate directories are created automatically. The `key` provided to
/// [`Storage::put`] is joined with the base directory to form the final path;
/// keys that try to climb out of it are rejected.
///
/// # Example
///
/// ```rust,no_run
/// use paste_sanitizer::FsStorage;
///
/// let storage = FsStorage::new("/var/www/uploads");
/// ```
pub struct FsStorage {
    base_dir: PathBuf,
}

impl FsStorage {
    /// Create a new `FsStorage` rooted at the given directory.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }
}

impl Storage for FsStorage {
    async fn put(&self, key: &str, image: &BinaryBlob) -> Result<()> {
        if key.split(['/', '\\']).any(|segment| segment == "..") {
            return Err(PasteError::Upload(
                format!("refusing key outside storage root: {key}").into(),
            ));
        }
        let path = self.base_dir.join(key.trim_start_matches('/'));

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| PasteError::Upload(Box::new(e)))?;
        }

        tokio::fs::write(&path, &image.bytes)
            .await
            .map_err(|e| PasteError::Upload(Box::new(e)))?;

        tracing::debug!(path = %path.display(), bytes = image.bytes.len(), "Wrote pasted image");
        Ok(())
    }
}
