use crate::error::AssetError;
use crate::key::{owned_key, owner_prefix};
use crate::model::AssetRecord;
use crate::ports::BlobStore;
use cutout_kernel::security::identity::Identity;
use std::sync::Arc;
use tracing::{info, warn};

/// List and delete, always confined to the caller's own namespace.
#[derive(Debug, Clone)]
pub struct OwnedAssets {
    store: Arc<dyn BlobStore>,
}

impl OwnedAssets {
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self { store }
    }

    /// Everything under `images/{identity}/`, ordered by key.
    ///
    /// # Errors
    /// Propagates the store failure; a partial listing is never returned.
    pub async fn list_owned(&self, identity: &Identity) -> Result<Vec<AssetRecord>, AssetError> {
        let prefix = owner_prefix(identity);
        let mut items = self.store.list(&prefix).await?;

        let before = items.len();
        items.retain(|item| item.pathname.starts_with(&prefix));
        if items.len() != before {
            warn!(identity = %identity, dropped = before - items.len(), "Store returned foreign keys");
        }

        items.sort_by(|a, b| a.pathname.cmp(&b.pathname));
        Ok(items)
    }

    /// Deletes `target` (a key or URL) if it lies in `identity`'s namespace.
    ///
    /// Returns the deleted key.
    ///
    /// # Errors
    /// * [`AssetError::InvalidInput`] if no target is given.
    /// * [`AssetError::Forbidden`] if the target is not owned; the store is not touched.
    /// * The store's failure otherwise, including for owned keys that no longer exist.
    pub async fn delete_owned(
        &self,
        identity: &Identity,
        target: Option<&str>,
    ) -> Result<String, AssetError> {
        let target = target
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AssetError::invalid("pathname or url required"))?;

        let Some(key) = owned_key(target, identity) else {
            warn!(identity = %identity, requested = target, "Rejected delete outside own namespace");
            return Err(AssetError::Forbidden {
                message: "Target does not belong to the caller".into(),
                context: None,
            });
        };

        self.store.delete(key).await?;

        info!(identity = %identity, key, "Asset deleted");
        Ok(key.to_owned())
    }
}
