use anyhow::Context;
use tracing::{info, warn};
use uuid::Uuid;

use super::{form::PhotoUpload, model::Trix};
use crate::storage::{photo_key, StorageClient};

/// Uploads a validated photo and returns its storage key.
pub async fn store_photo(
    storage: &dyn StorageClient,
    owner: Uuid,
    upload: PhotoUpload,
) -> anyhow::Result<String> {
    let key = photo_key(owner, Uuid::new_v4(), &upload.content_type);
    let size = upload.body.len();
    storage
        .put_object(&key, upload.body, &upload.content_type)
        .await
        .with_context(|| format!("put_object {}", key))?;
    info!(%owner, %key, size, file_name = %upload.file_name, "photo stored");
    Ok(key)
}

/// Best-effort removal of a photo no record points at anymore.
pub async fn discard_photo(storage: &dyn StorageClient, key: &str) {
    if let Err(e) = storage.delete_object(key).await {
        warn!(error = ?e, %key, "failed to delete photo object");
    }
}

pub async fn presign(
    storage: &dyn StorageClient,
    key: &str,
    expires_seconds: u64,
) -> anyhow::Result<String> {
    storage
        .presign_get(key, expires_seconds)
        .await
        .with_context(|| format!("presign url for {}", key))
}

/// Presigned photo URL per record, `None` where a record has no photo.
pub async fn presign_all(
    storage: &dyn StorageClient,
    trixs: &[Trix],
    expires_seconds: u64,
) -> anyhow::Result<Vec<Option<String>>> {
    let mut out = Vec::with_capacity(trixs.len());
    for t in trixs {
        let url = match &t.photo {
            Some(key) => Some(presign(storage, key, expires_seconds).await?),
            None => None,
        };
        out.push(url);
    }
    Ok(out)
}
