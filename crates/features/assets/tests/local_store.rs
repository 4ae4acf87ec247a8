mod common;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use common::FakeRemover;
use cutout_assets::key::AssetKey;
use cutout_assets::ports::{Access, BlobStore, ImageTransform};
use cutout_assets::{AssetError, AssetPipeline, LocalBlobStore, MirrorPng};
use cutout_kernel::security::identity::Identity;
use cutout_storage::Storage;
use image::{ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;
use std::sync::Arc;
use tempfile::TempDir;

async fn store(temp: &TempDir) -> LocalBlobStore {
    let storage = Storage::builder().root(temp.path()).connect().await.unwrap();
    LocalBlobStore::new(storage, "https://img.example/")
}

#[tokio::test]
async fn put_list_read_delete() {
    let temp = TempDir::new().unwrap();
    let store = store(&temp).await;
    let me = Identity::generate();
    let key = AssetKey::derive(&me, 1_700_000_000_000, "abcd1234");

    let stored = store.put(&key, b"png".to_vec(), Access::Public).await.unwrap();
    assert_eq!(stored.pathname, key.as_str());
    assert_eq!(stored.url, format!("https://img.example/files/{key}"));

    let listed = store.list(&format!("images/{me}/")).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].size, 3);
    assert!(chrono::DateTime::parse_from_rfc3339(&listed[0].uploaded_at).is_ok());

    assert_eq!(store.read(key.as_str()).await.unwrap(), b"png");

    store.delete(key.as_str()).await.unwrap();
    assert!(store.list(&format!("images/{me}/")).await.unwrap().is_empty());
}

#[tokio::test]
async fn unknown_and_hostile_reads_are_not_found() {
    let temp = TempDir::new().unwrap();
    let store = store(&temp).await;

    for key in ["images/none/1-x.png", "images/../../etc/passwd"] {
        assert!(matches!(store.read(key).await, Err(AssetError::NotFound { .. })), "{key}");
    }
}

#[tokio::test]
async fn deleting_a_missing_object_is_a_store_failure() {
    let temp = TempDir::new().unwrap();
    let store = store(&temp).await;

    let err = store.delete("images/none/1-x.png").await.unwrap_err();
    assert!(matches!(err, AssetError::Store { .. }));
}

#[tokio::test]
async fn real_transform_mirrors_stored_png() {
    let temp = TempDir::new().unwrap();
    let store = Arc::new(store(&temp).await);

    let mut source = RgbaImage::new(3, 1);
    source.put_pixel(0, 0, Rgba([10, 20, 30, 255]));
    let mut png = Cursor::new(Vec::new());
    source.write_to(&mut png, ImageFormat::Png).unwrap();

    // The fake remover prefixes bytes, so feed the transform directly and persist the result.
    let mirrored = MirrorPng.mirror(png.get_ref()).unwrap();
    let key = AssetKey::mint(&Identity::generate());
    store.put(&key, mirrored, Access::Public).await.unwrap();

    let decoded = image::load_from_memory(&store.read(key.as_str()).await.unwrap()).unwrap().into_rgba8();
    assert_eq!(decoded.get_pixel(2, 0), &Rgba([10, 20, 30, 255]));
    assert_eq!(decoded.get_pixel(0, 0)[3], 0);
}

#[tokio::test]
async fn undecodable_removal_output_fails_without_writing() {
    let temp = TempDir::new().unwrap();
    let store = Arc::new(store(&temp).await);
    let pipeline = AssetPipeline::new(Arc::new(FakeRemover::default()), Arc::new(MirrorPng), store.clone());
    let me = Identity::generate();

    let body = serde_json::json!({ "fileB64": STANDARD.encode(b"not an image") }).to_string();
    let err = pipeline.upload(&me, body.as_bytes()).await.unwrap_err();

    assert!(matches!(err, AssetError::Image { .. }));
    assert!(store.list(&format!("images/{me}/")).await.unwrap().is_empty());
}
