use crate::error::AssetError;
use crate::key::AssetKey;
use crate::model::AssetRecord;
use crate::ports::{Access, BlobStore, StoredBlob};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use cutout_domain::constants::FILES_PATH;
use cutout_storage::{ObjectMeta, Storage, StorageError};
use std::sync::Arc;

/// [`BlobStore`] on the local sandboxed object store.
///
/// Objects are publicly retrievable at `{public_url}/files/{key}`.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    storage: Storage,
    public_url: Arc<str>,
}

impl LocalBlobStore {
    pub fn new(storage: Storage, public_url: &str) -> Self {
        Self { storage, public_url: public_url.trim_end_matches('/').into() }
    }

    #[must_use]
    pub fn url_for(&self, key: &str) -> String {
        format!("{}{FILES_PATH}/{key}", self.public_url)
    }

    fn record(&self, meta: ObjectMeta) -> AssetRecord {
        let uploaded_at = DateTime::<Utc>::from(meta.modified).to_rfc3339_opts(SecondsFormat::Millis, true);
        AssetRecord { url: self.url_for(&meta.key), pathname: meta.key, size: meta.size, uploaded_at }
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, key: &AssetKey, bytes: Vec<u8>, _access: Access) -> Result<StoredBlob, AssetError> {
        self.storage.put(key.as_str(), &bytes).await?;
        Ok(StoredBlob { url: self.url_for(key.as_str()), pathname: key.to_string() })
    }

    async fn list(&self, prefix: &str) -> Result<Vec<AssetRecord>, AssetError> {
        let objects = self.storage.list(prefix).await?;
        Ok(objects.into_iter().map(|meta| self.record(meta)).collect())
    }

    async fn delete(&self, key: &str) -> Result<(), AssetError> {
        Ok(self.storage.delete(key).await?)
    }

    async fn read(&self, key: &str) -> Result<Vec<u8>, AssetError> {
        match self.storage.read(key).await {
            Ok(bytes) => Ok(bytes),
            Err(
                StorageError::NotFound { .. }
                | StorageError::InvalidKey { .. }
                | StorageError::PathTraversalAttempt { .. },
            ) => Err(AssetError::NotFound { message: key.to_owned().into(), context: None }),
            Err(err) => Err(err.into()),
        }
    }
}
