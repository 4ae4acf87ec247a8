//! HTTP client for the remove.bg background-removal API.

use crate::error::{AssetError, AssetErrorExt};
use crate::ports::BackgroundRemover;
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use cutout_domain::config::RemovalConfig;
use reqwest::StatusCode;
use reqwest::header::ACCEPT;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

const API_KEY_HEADER: &str = "X-Api-Key";

#[derive(Serialize)]
struct RemovalRequest<'a> {
    image_file_b64: &'a str,
    size: &'static str,
}

#[derive(Deserialize)]
struct RemovalErrors {
    errors: Vec<RemovalErrorItem>,
}

#[derive(Deserialize)]
struct RemovalErrorItem {
    title: String,
    detail: Option<String>,
}

/// [`BackgroundRemover`] backed by remove.bg.
#[derive(Clone)]
pub struct RemoveBgClient {
    http: reqwest::Client,
    endpoint: Arc<str>,
    api_key: Arc<str>,
}

impl fmt::Debug for RemoveBgClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoveBgClient").field("endpoint", &self.endpoint).finish_non_exhaustive()
    }
}

impl RemoveBgClient {
    /// Builds the client with the configured request timeout.
    ///
    /// # Errors
    /// Returns [`AssetError::Transport`] if the TLS backend cannot be initialized.
    pub fn new(config: &RemovalConfig) -> Result<Self, AssetError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            endpoint: config.endpoint.as_str().into(),
            api_key: config.api_key.as_str().into(),
        })
    }
}

#[async_trait]
impl BackgroundRemover for RemoveBgClient {
    async fn remove(&self, image: Vec<u8>) -> Result<Vec<u8>, AssetError> {
        let encoded = STANDARD.encode(&image);
        let payload = RemovalRequest { image_file_b64: &encoded, size: "auto" };

        let response = self
            .http
            .post(&*self.endpoint)
            .header(API_KEY_HEADER, &*self.api_key)
            .header(ACCEPT, "image/png")
            .json(&payload)
            .send()
            .await
            .context("Background removal request failed")?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Background removal rejected the image");
            return Err(AssetError::Upstream {
                message: upstream_message(status, &text).into(),
                context: None,
            });
        }

        let bytes = response.bytes().await.context("Failed to read background removal result")?;
        debug!(input = image.len(), output = bytes.len(), "Background removed");
        Ok(bytes.to_vec())
    }
}

/// Extracts readable text from an error answer: remove.bg's `errors[].title` when present,
/// the raw body otherwise, and the status reason for empty bodies.
fn upstream_message(status: StatusCode, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<RemovalErrors>(body) {
        let titles: Vec<_> = parsed
            .errors
            .into_iter()
            .map(|e| match e.detail {
                Some(detail) => format!("{}: {detail}", e.title),
                None => e.title,
            })
            .collect();
        if !titles.is_empty() {
            return titles.join("; ");
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        status.canonical_reason().unwrap_or("Upstream error").to_owned()
    } else {
        trimmed.to_owned()
    }
}
