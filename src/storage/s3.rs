//! S3 image storage (requires the `s3` feature).

use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;

use crate::error::{PasteError, Result};
use crate::media::BinaryBlob;
use crate::storage::{Storage, file_name};

/// `Cache-Control` for objects whose key is never rewritten.
pub const IMMUTABLE_CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

/// Stores pasted images in an S3 (or S3-compatible) bucket.
///
/// Each object is written with the image's bare MIME type, an inline
/// `Content-Disposition` naming the file, and a `Cache-Control` header
/// ([`IMMUTABLE_CACHE_CONTROL`] unless changed), so the bucket or a CDN in
/// front of it can serve the URL [`StorageUploader`](crate::StorageUploader)
/// hands back directly.
///
/// ```rust,ignore
/// use paste_sanitizer::{Credentials, Region, S3Config, S3Storage, StorageUploader};
///
/// let creds = Credentials::new("AKID", "SECRET", None, None, "my-app");
/// let config = S3Config::builder()
///     .region(Region::new("us-east-1"))
///     .credentials_provider(creds)
///     .build();
/// let storage = S3Storage::from_conf(config, "my-bucket").cache_control(None);
/// let uploader = StorageUploader::new(storage, "https://my-bucket.s3.amazonaws.com");
/// ```
pub struct S3Storage {
    client: Client,
    bucket: String,
    cache_control: Option<String>,
}

impl S3Storage {
    pub fn new(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            cache_control: Some(IMMUTABLE_CACHE_CONTROL.to_string()),
        }
    }

    /// Build the client from an explicit [`aws_sdk_s3::Config`], e.g. for a
    /// custom endpoint with `force_path_style(true)`.
    pub fn from_conf(config: aws_sdk_s3::Config, bucket: impl Into<String>) -> Self {
        Self::new(Client::from_conf(config), bucket)
    }

    /// Build the client from the ambient AWS environment (env vars, profile
    /// files, instance metadata).
    pub async fn from_env(bucket: impl Into<String>) -> Self {
        let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .load()
            .await;
        Self::new(Client::new(&config), bucket)
    }

    /// `Cache-Control` sent with every image. `None` omits the header.
    pub fn cache_control(mut self, value: Option<&str>) -> Self {
        self.cache_control = value.map(str::to_string);
        self
    }
}

impl Storage for S3Storage {
    async fn put(&self, key: &str, image: &BinaryBlob) -> Result<()> {
        let content_type = image.essence();
        let disposition = format!(r#"inline; filename="{}""#, file_name(key));

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(image.bytes.clone()))
            .content_type(&content_type)
            .content_disposition(disposition)
            .set_cache_control(self.cache_control.clone())
            .send()
            .await
            .map_err(|e| PasteError::Upload(Box::new(e)))?;

        tracing::debug!(
            bucket = %self.bucket,
            key,
            content_type,
            bytes = image.bytes.len(),
            "Stored pasted image in S3"
        );
        Ok(())
    }
}
