#![allow(dead_code)]

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use cutout_assets::AssetError;
use cutout_assets::key::AssetKey;
use cutout_assets::model::AssetRecord;
use cutout_assets::ports::{Access, BackgroundRemover, BlobStore, ImageTransform, StoredBlob};
use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Prefixes its input with `cut:` or fails with a fixed upstream text.
#[derive(Debug, Default)]
pub struct FakeRemover {
    calls: AtomicUsize,
    failure: Option<String>,
}

impl FakeRemover {
    pub fn failing(text: &str) -> Self {
        Self { calls: AtomicUsize::new(0), failure: Some(text.to_owned()) }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BackgroundRemover for FakeRemover {
    async fn remove(&self, image: Vec<u8>) -> Result<Vec<u8>, AssetError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.failure {
            Some(text) => Err(AssetError::Upstream { message: text.clone().into(), context: None }),
            None => Ok([b"cut:".as_slice(), &image].concat()),
        }
    }
}

/// Reverses the bytes, standing in for a horizontal mirror.
#[derive(Debug, Default)]
pub struct FakeTransform {
    calls: AtomicUsize,
    fail: bool,
}

impl FakeTransform {
    pub fn failing() -> Self {
        Self { calls: AtomicUsize::new(0), fail: true }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ImageTransform for FakeTransform {
    fn mirror(&self, image: &[u8]) -> Result<Vec<u8>, AssetError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(AssetError::Transform { message: "cannot mirror".into(), context: None });
        }
        Ok(image.iter().rev().copied().collect())
    }
}

/// In-memory store recording every mutation.
#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: Mutex<BTreeMap<String, Vec<u8>>>,
    deletes: AtomicUsize,
    fail_list: bool,
    ignore_prefix: bool,
}

impl MemoryStore {
    pub fn with_keys<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        let store = Self::default();
        {
            let mut objects = store.objects.lock().unwrap();
            for key in keys {
                objects.insert(key.into(), b"png".to_vec());
            }
        }
        store
    }

    /// Listing fails with a store error.
    pub fn failing_list() -> Self {
        Self { fail_list: true, ..Self::default() }
    }

    /// Listing returns every object regardless of the requested prefix.
    pub fn leaky(self) -> Self {
        Self { ignore_prefix: true, ..self }
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }

    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    pub fn deletes(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    pub fn url_for(key: &str) -> String {
        format!("https://blob.test/files/{key}")
    }
}

#[async_trait]
impl BlobStore for MemoryStore {
    async fn put(&self, key: &AssetKey, bytes: Vec<u8>, _access: Access) -> Result<StoredBlob, AssetError> {
        self.objects.lock().unwrap().insert(key.to_string(), bytes);
        Ok(StoredBlob { url: Self::url_for(key.as_str()), pathname: key.to_string() })
    }

    async fn list(&self, prefix: &str) -> Result<Vec<AssetRecord>, AssetError> {
        if self.fail_list {
            return Err(AssetError::from("listing backend unavailable"));
        }
        let objects = self.objects.lock().unwrap();
        Ok(objects
            .iter()
            .rev()
            .filter(|(key, _)| self.ignore_prefix || key.starts_with(prefix))
            .map(|(key, bytes)| AssetRecord {
                url: Self::url_for(key),
                pathname: key.clone(),
                size: bytes.len() as u64,
                uploaded_at: "2026-01-01T00:00:00.000Z".to_owned(),
            })
            .collect())
    }

    async fn delete(&self, key: &str) -> Result<(), AssetError> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        match self.objects.lock().unwrap().remove(key) {
            Some(_) => Ok(()),
            None => Err(AssetError::from(format!("no object at {key}"))),
        }
    }

    async fn read(&self, key: &str) -> Result<Vec<u8>, AssetError> {
        self.get(key).ok_or_else(|| AssetError::NotFound { message: key.to_owned().into(), context: None })
    }
}

pub fn upload_body(bytes: &[u8]) -> Vec<u8> {
    serde_json::json!({ "fileB64": STANDARD.encode(bytes) }).to_string().into_bytes()
}
