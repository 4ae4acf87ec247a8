//! Contracts of the external collaborators the asset slice drives.

use crate::error::AssetError;
use crate::key::AssetKey;
use crate::model::AssetRecord;
use async_trait::async_trait;
use std::fmt::Debug;

/// Strips the background from an image.
#[async_trait]
pub trait BackgroundRemover: Debug + Send + Sync {
    /// Returns the cut-out image.
    ///
    /// Non-success answers become [`AssetError::Upstream`] carrying the service's error
    /// text; connection failures become [`AssetError::Transport`].
    async fn remove(&self, image: Vec<u8>) -> Result<Vec<u8>, AssetError>;
}

/// CPU-bound image work. Callers run it on the blocking pool.
pub trait ImageTransform: Debug + Send + Sync {
    /// Mirrors the image horizontally and encodes it as PNG, alpha preserved.
    fn mirror(&self, image: &[u8]) -> Result<Vec<u8>, AssetError>;
}

/// Visibility of a stored object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Access {
    #[default]
    Public,
}

/// Result of a successful write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    pub url: String,
    pub pathname: String,
}

/// Object storage holding the processed images.
#[async_trait]
pub trait BlobStore: Debug + Send + Sync {
    async fn put(&self, key: &AssetKey, bytes: Vec<u8>, access: Access) -> Result<StoredBlob, AssetError>;

    /// Every object whose key starts with `prefix`.
    async fn list(&self, prefix: &str) -> Result<Vec<AssetRecord>, AssetError>;

    /// Fails when there is nothing stored under `key`.
    async fn delete(&self, key: &str) -> Result<(), AssetError>;

    /// Fetches an object for public retrieval; unknown keys are [`AssetError::NotFound`].
    async fn read(&self, key: &str) -> Result<Vec<u8>, AssetError>;
}
