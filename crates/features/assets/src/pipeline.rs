use crate::error::AssetError;
use crate::key::AssetKey;
use crate::model::UploadRequest;
use crate::ports::{Access, BackgroundRemover, BlobStore, ImageTransform, StoredBlob};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use cutout_kernel::security::identity::Identity;
use std::sync::Arc;
use tracing::{debug, info};

/// The upload path: decode, remove background, mirror, persist.
///
/// Steps run strictly in order and the first failure ends the upload. Nothing is written
/// unless every earlier step succeeded.
#[derive(Debug, Clone)]
pub struct AssetPipeline {
    remover: Arc<dyn BackgroundRemover>,
    transform: Arc<dyn ImageTransform>,
    store: Arc<dyn BlobStore>,
}

impl AssetPipeline {
    pub fn new(
        remover: Arc<dyn BackgroundRemover>,
        transform: Arc<dyn ImageTransform>,
        store: Arc<dyn BlobStore>,
    ) -> Self {
        Self { remover, transform, store }
    }

    /// Runs the whole upload for `identity` on a raw JSON body.
    ///
    /// # Errors
    /// * [`AssetError::InvalidInput`] for bad JSON, a missing `fileB64` or invalid base64.
    /// * [`AssetError::Upstream`] / [`AssetError::Transport`] when background removal fails.
    /// * [`AssetError::Transform`] / [`AssetError::Image`] when mirroring fails.
    /// * Whatever the store reports when the write fails.
    pub async fn upload(&self, identity: &Identity, body: &[u8]) -> Result<StoredBlob, AssetError> {
        let source = decode_body(body)?;
        debug!(identity = %identity, bytes = source.len(), "Upload decoded");

        let cutout = self.remover.remove(source).await?;

        let transform = Arc::clone(&self.transform);
        let png = tokio::task::spawn_blocking(move || transform.mirror(&cutout))
            .await
            .map_err(|e| AssetError::Transform {
                message: e.to_string().into(),
                context: Some("Transform task failed".into()),
            })??;

        let key = AssetKey::mint(identity);
        let stored = self.store.put(&key, png, Access::Public).await?;

        info!(identity = %identity, key = %key, "Asset stored");
        Ok(stored)
    }
}

/// Parses the upload body and returns the decoded image bytes.
///
/// # Errors
/// Returns [`AssetError::InvalidInput`] for malformed JSON, a missing or blank `fileB64` and
/// undecodable base64.
pub fn decode_body(body: &[u8]) -> Result<Vec<u8>, AssetError> {
    let request: UploadRequest =
        serde_json::from_slice(body).map_err(|e| AssetError::InvalidInput {
            message: "Malformed JSON body".into(),
            context: Some(e.to_string().into()),
        })?;

    let encoded = request
        .file_b64
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AssetError::invalid("fileB64 required"))?;

    let payload = strip_data_url(encoded);
    let bytes = STANDARD.decode(payload).map_err(|e| AssetError::InvalidInput {
        message: "fileB64 is not valid base64".into(),
        context: Some(e.to_string().into()),
    })?;

    if bytes.is_empty() {
        return Err(AssetError::invalid("fileB64 required"));
    }
    Ok(bytes)
}

/// Drops a `data:<mime>;base64,` prefix if present.
fn strip_data_url(encoded: &str) -> &str {
    if encoded.starts_with("data:") {
        encoded.split_once(',').map_or(encoded, |(_, data)| data)
    } else {
        encoded
    }
}
