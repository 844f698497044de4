//! Photo object storage.
//!
//! Photos are keyed `trix/<owner>/<uuid>.<ext>`; the extension is derived
//! from the upload's content type via [`image_extension`].

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use aws_config::{defaults, BehaviorVersion};
use aws_credential_types::Credentials;
use aws_sdk_s3::{
    config::{Builder as S3ConfigBuilder, Region},
    presigning::PresigningConfig,
    Client,
};
use aws_smithy_types::byte_stream::ByteStream;
use bytes::Bytes;
use tracing::debug;
use uuid::Uuid;

use crate::config::MinioConfig;

pub const PHOTO_PREFIX: &str = "trix";

/// File extension for the image types accepted as trix photos.
pub fn image_extension(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/gif" => Some("gif"),
        "image/heic" => Some("heic"),
        _ => None,
    }
}

pub fn photo_key(owner: Uuid, photo_id: Uuid, content_type: &str) -> String {
    let ext = image_extension(content_type).unwrap_or("bin");
    format!("{}/{}/{}.{}", PHOTO_PREFIX, owner, photo_id, ext)
}

/// Where photo bytes live. Keys come from [`photo_key`].
#[async_trait]
pub trait StorageClient: Send + Sync {
    async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> anyhow::Result<()>;
    async fn delete_object(&self, key: &str) -> anyhow::Result<()>;
    /// Time-limited GET URL for a photo.
    async fn presign_get(&self, key: &str, seconds: u64) -> anyhow::Result<String>;
}

/// MinIO (or any S3-compatible endpoint, path-style addressing).
#[derive(Clone)]
pub struct S3PhotoStorage {
    client: Client,
    bucket: String,
}

impl S3PhotoStorage {
    pub async fn connect(cfg: &MinioConfig) -> anyhow::Result<Self> {
        let credentials = Credentials::new(
            &cfg.access_key,
            &cfg.secret_key,
            None,
            None,
            "trix-minio",
        );
        let shared = defaults(BehaviorVersion::latest())
            .region(Region::new(cfg.region.clone()))
            .credentials_provider(credentials)
            .endpoint_url(&cfg.endpoint)
            .load()
            .await;

        let conf = S3ConfigBuilder::from(&shared).force_path_style(true).build();
        debug!(endpoint = %cfg.endpoint, bucket = %cfg.bucket, "photo storage configured");

        Ok(Self {
            client: Client::from_conf(conf),
            bucket: cfg.bucket.clone(),
        })
    }
}

#[async_trait]
impl StorageClient for S3PhotoStorage {
    async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> anyhow::Result<()> {
        let size = body.len();
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_length(size as i64)
            .content_type(content_type)
            .body(ByteStream::from(body))
            .send()
            .await
            .with_context(|| format!("upload photo {key}"))?;
        debug!(%key, size, content_type, "photo uploaded");
        Ok(())
    }

    async fn delete_object(&self, key: &str) -> anyhow::Result<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .with_context(|| format!("delete photo {key}"))?;
        debug!(%key, "photo deleted");
        Ok(())
    }

    async fn presign_get(&self, key: &str, seconds: u64) -> anyhow::Result<String> {
        let expiry = PresigningConfig::expires_in(Duration::from_secs(seconds))
            .context("photo url expiry")?;
        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(expiry)
            .await
            .with_context(|| format!("presign photo {key}"))?;
        Ok(presigned.uri().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_extension() {
        assert_eq!(image_extension("image/jpeg"), Some("jpg"));
        assert_eq!(image_extension("image/jpg"), Some("jpg"));
        assert_eq!(image_extension("image/png"), Some("png"));
        assert_eq!(image_extension("image/webp"), Some("webp"));
        assert_eq!(image_extension("image/gif"), Some("gif"));
        assert_eq!(image_extension("image/heic"), Some("heic"));
        assert_eq!(image_extension("application/octet-stream"), None);
        assert_eq!(image_extension("whatever/else"), None);
    }

    #[test]
    fn key_is_scoped_by_owner_with_extension() {
        let owner = Uuid::new_v4();
        let id = Uuid::new_v4();
        assert_eq!(
            photo_key(owner, id, "image/jpeg"),
            format!("trix/{}/{}.jpg", owner, id)
        );
        assert!(photo_key(owner, id, "application/pdf").ends_with(".bin"));
    }
}
