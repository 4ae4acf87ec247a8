//! # Assets
//!
//! The asset slice: anonymous callers upload an image, get its background removed and the
//! result mirrored, then list or delete only what they own.
//!
//! The slice drives three collaborators through [`ports`]: a [`BackgroundRemover`], an
//! [`ImageTransform`] and a [`BlobStore`]. [`init`] wires the production adapters
//! ([`RemoveBgClient`], [`MirrorPng`], [`LocalBlobStore`]); tests swap in their own.
//!
//! Ownership is purely key based: every object lives under `images/{identity}/`, see [`key`].

pub mod action;
pub mod error;
pub mod facade;
#[cfg(feature = "server")]
pub mod handler;
pub mod key;
pub mod model;
pub mod pipeline;
pub mod ports;
pub mod removal;
pub mod store;
pub mod transform;

pub use crate::error::{AssetError, AssetErrorExt};
pub use crate::facade::OwnedAssets;
pub use crate::pipeline::AssetPipeline;
pub use crate::ports::{BackgroundRemover, BlobStore, ImageTransform};
pub use crate::removal::RemoveBgClient;
pub use crate::store::LocalBlobStore;
pub use crate::transform::MirrorPng;

use cutout_domain::config::ApiConfig;
use cutout_domain::registry::{FeatureSlice, InitializedSlice};
use cutout_storage::Storage;
use std::any::Any;
use std::sync::Arc;

/// Asset feature state.
#[derive(Debug)]
pub struct Assets {
    pipeline: AssetPipeline,
    owned: OwnedAssets,
    store: Arc<dyn BlobStore>,
}

impl Assets {
    pub fn new(
        remover: Arc<dyn BackgroundRemover>,
        transform: Arc<dyn ImageTransform>,
        store: Arc<dyn BlobStore>,
    ) -> Self {
        Self {
            pipeline: AssetPipeline::new(remover, transform, Arc::clone(&store)),
            owned: OwnedAssets::new(Arc::clone(&store)),
            store,
        }
    }

    #[must_use]
    pub const fn pipeline(&self) -> &AssetPipeline {
        &self.pipeline
    }

    #[must_use]
    pub const fn owned(&self) -> &OwnedAssets {
        &self.owned
    }

    #[must_use]
    pub fn store(&self) -> &dyn BlobStore {
        self.store.as_ref()
    }
}

impl FeatureSlice for Assets {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Initializes the asset feature with its production collaborators.
///
/// # Errors
/// Fails when the removal credential is missing, the object store root cannot be prepared
/// or the HTTP client cannot be built.
pub async fn init(config: &ApiConfig) -> Result<InitializedSlice, AssetError> {
    if config.removal.api_key.trim().is_empty() {
        return Err(AssetError::Internal {
            message: "removal.api_key is not configured".into(),
            context: Some("Set CUTOUT__REMOVAL__API_KEY".into()),
        });
    }

    let storage = Storage::builder()
        .root(&config.storage.data_dir)
        .connect()
        .await
        .context("Failed to open the object store")?;

    let store = Arc::new(LocalBlobStore::new(storage, &config.server.public_url));
    let remover = Arc::new(RemoveBgClient::new(&config.removal)?);

    tracing::info!(
        endpoint = %config.removal.endpoint,
        public_url = %config.server.public_url,
        "Assets slice initialized"
    );

    Ok(InitializedSlice::new(Assets::new(remover, Arc::new(MirrorPng), store)))
}
