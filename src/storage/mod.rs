//! Where uploaded paste images end up.
//!
//! A [`Storage`] persists one image blob under a key. [`StorageUploader`]
//! picks a fresh key per image, stores it and answers with the public URL,
//! so any backend can serve as the [`Uploader`](crate::Uploader) of a
//! [`Paster`](crate::Paster).
//!
//! - [`FsStorage`] writes under a local directory, e.g. one served by a web
//!   server.
//! - [`S3Storage`] writes to an S3 (or compatible) bucket with caching
//!   headers suited to immutable image keys (requires the `s3` feature).

mod fs;
#[cfg(feature = "s3")]
mod s3;
mod uploader;

#[cfg(feature = "s3")]
pub use aws_config::Region;
#[cfg(feature = "s3")]
pub use aws_sdk_s3::config::Credentials;
#[cfg(feature = "s3")]
pub use aws_sdk_s3::{Client as S3Client, Config as S3Config, config::Builder as S3ConfigBuilder};
pub use fs::FsStorage;
#[cfg(feature = "s3")]
pub use s3::{IMMUTABLE_CACHE_CONTROL, S3Storage};
pub use uploader::StorageUploader;

use std::future::Future;

use crate::error::Result;
use crate::media::BinaryBlob;

/// Backend that persists a pasted image under a key.
///
/// Keys come from [`StorageUploader`] and are never reused, so a backend may
/// treat every stored object as immutable.
///
/// ```rust,no_run
/// use paste_sanitizer::{BinaryBlob, Result, Storage};
///
/// struct Discard;
///
/// impl Storage for Discard {
///     async fn put(&self, key: &str, image: &BinaryBlob) -> Result<()> {
///         println!("{key}: {} bytes of {}", image.bytes.len(), image.essence());
///         Ok(())
///     }
/// }
/// ```
pub trait Storage: Send + Sync + 'static {
    fn put(&self, key: &str, image: &BinaryBlob) -> impl Future<Output = Result<()>> + Send;
}

/// Last path segment of a storage key.
pub(crate) fn file_name(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}
