//! Core object store: a sandboxed directory where every object key maps to one file.

use crate::builder::StorageBuilder;
use crate::error::{StorageError, StorageErrorExt};
use crate::maintenance;
use crate::security::{self, TMP_MARKER};
use std::ops::Deref;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;
use walkdir::WalkDir;

/// Metadata of a stored object as reported by [`Storage::list`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectMeta {
    /// The object key, always `/`-separated.
    pub key: String,
    /// Size in bytes.
    pub size: u64,
    /// Last modification time of the backing file.
    pub modified: SystemTime,
}

#[derive(Debug)]
pub struct StorageInner {
    /// Canonicalized physical root of the sandbox.
    pub(crate) root: PathBuf,
    /// Counter used to build unique temporary file names.
    pub(crate) tmp_counter: AtomicU64,
}

/// A thread-safe handle to the object store.
///
/// Objects are addressed by `/`-separated keys such as `images/<owner>/<name>.png`; each key
/// maps to exactly one file below the root. Writes are atomic (temp file, `fsync`, rename),
/// so readers and listings never observe a half-written object.
///
/// The handle is reference-counted and cheap to clone.
///
/// # Example
///
/// ```rust
/// use cutout_storage::{Storage, StorageError};
///
/// #[tokio::main]
/// async fn main() -> Result<(), StorageError> {
///     # let tmp = tempfile::tempdir().unwrap();
///     # let root = tmp.path().join("data");
///     let storage = Storage::builder().root(&root).connect().await?;
///
///     storage.put("images/owner/1-a.png", b"png bytes").await?;
///     let listed = storage.list("images/owner/").await?;
///     assert_eq!(listed[0].key, "images/owner/1-a.png");
///
///     storage.delete("images/owner/1-a.png").await?;
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Storage {
    pub(crate) inner: Arc<StorageInner>,
}

impl Deref for Storage {
    type Target = StorageInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl Storage {
    #[must_use = "The storage engine is not initialized until you call .connect()"]
    pub fn builder() -> StorageBuilder {
        StorageBuilder::new()
    }

    /// The canonical sandbox root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves an object key to its physical path inside the sandbox.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidKey`] or [`StorageError::PathTraversalAttempt`] for keys
    /// that are malformed or would leave the sandbox.
    pub fn resolve(&self, key: &str) -> Result<PathBuf, StorageError> {
        security::resolve_key(&self.root, key)
    }

    /// Reads a whole object into memory.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] if no object is stored under `key`.
    pub async fn read(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        let resolved = self.resolve(key)?;

        match fs::read(&resolved).await {
            Ok(data) => Ok(data),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound { message: key.to_owned().into(), context: None })
            },
            Err(err) => Err(StorageError::Io {
                source: err,
                context: Some(format!("Read failed: {key}").into()),
            }),
        }
    }

    /// Stores `data` under `key`, replacing any previous object atomically.
    ///
    /// The bytes go to a unique temporary sibling first, are synced to disk and then renamed
    /// over the target. Missing parent directories are created.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if the disk is full or the rename fails.
    pub async fn put(&self, key: &str, data: &[u8]) -> Result<(), StorageError> {
        let resolved = self.resolve(key)?;

        if let Some(parent) = resolved.parent() {
            fs::create_dir_all(parent)
                .await
                .context(format!("Failed to create directories for {key}"))?;
        }

        let temp = unique_tmp_path(&resolved, &self.tmp_counter);

        let file = fs::OpenOptions::new()
            .create_new(true)
            .write(true)
            .open(&temp)
            .await
            .context(format!("Temp creation failed: {}", temp.display()))?;
        fill_tmp(file, &temp, data).await?;

        if let Err(err) = fs::rename(&temp, &resolved).await {
            let _ = fs::remove_file(&temp).await;
            return Err(StorageError::Io {
                source: err,
                context: Some(format!("Atomic swap failed for {key}").into()),
            });
        }

        if let Some(parent) = resolved.parent() {
            Self::sync_dir(parent).await;
        }

        debug!(key, bytes = data.len(), "Object stored");
        Ok(())
    }

    /// Removes the object stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] if there is nothing to delete.
    pub async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let resolved = self.resolve(key)?;

        match fs::remove_file(&resolved).await {
            Ok(()) => {},
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound {
                    message: key.to_owned().into(),
                    context: None,
                });
            },
            Err(err) => {
                return Err(StorageError::Io {
                    source: err,
                    context: Some(format!("Failed to delete: {key}").into()),
                });
            },
        }

        debug!(key, "Object deleted");
        Ok(())
    }

    /// Checks whether an object is stored under `key`.
    ///
    /// # Errors
    ///
    /// Fails only if the key itself is rejected by the sandbox.
    pub fn exists(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.resolve(key)?.is_file())
    }

    /// Lists every object whose key starts with `prefix`, ordered by key.
    ///
    /// Only the directory named by the part of `prefix` before its last `/` is walked.
    /// In-flight temporary files and symlinks are never reported.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidKey`] for malformed prefixes and [`StorageError::Io`]
    /// if the directory walk fails.
    pub async fn list(&self, prefix: &str) -> Result<Vec<ObjectMeta>, StorageError> {
        security::validate_prefix(prefix)?;

        let base = match prefix.rsplit_once('/') {
            Some((dir, _)) => self.resolve(dir)?,
            None => self.root.clone(),
        };
        if !base.is_dir() {
            return Ok(Vec::new());
        }

        let root = self.root.clone();
        let prefix = prefix.to_owned();

        tokio::task::spawn_blocking(move || walk_objects(&root, &base, &prefix))
            .await
            .map_err(|e| StorageError::Internal {
                message: e.to_string().into(),
                context: Some("Listing task failed".into()),
            })?
    }

    /// Removes temporary files orphaned by interrupted writes.
    pub async fn purge_tmp(&self) {
        maintenance::purge_tmp(&self.root).await;
    }

    async fn sync_dir(path: &Path) {
        match fs::File::open(path).await {
            Ok(dir) => {
                if let Err(err) = dir.sync_all().await {
                    tracing::warn!(path = %path.display(), error = %err, "Directory sync failed");
                }
            },
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "Directory open failed");
            },
        }
    }
}

fn walk_objects(root: &Path, base: &Path, prefix: &str) -> Result<Vec<ObjectMeta>, StorageError> {
    let mut objects = Vec::new();

    for entry in WalkDir::new(base).min_depth(1) {
        let entry = entry.map_err(|e| StorageError::Io {
            source: e.into(),
            context: Some(format!("Failed to walk {}", base.display()).into()),
        })?;

        if !entry.file_type().is_file() {
            continue;
        }
        let Some(key) = key_of(root, entry.path()) else {
            continue;
        };
        if !key.starts_with(prefix) || key.contains(TMP_MARKER) {
            continue;
        }

        let meta = entry.metadata().map_err(|e| StorageError::Io {
            source: e.into(),
            context: Some(format!("Failed to stat {key}").into()),
        })?;
        objects.push(ObjectMeta {
            key,
            size: meta.len(),
            modified: meta.modified().unwrap_or(SystemTime::UNIX_EPOCH),
        });
    }

    objects.sort_by(|a, b| a.key.cmp(&b.key));
    Ok(objects)
}

/// Rebuilds the `/`-separated key of a file below `root`.
fn key_of(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let segments = relative
        .components()
        .map(|c| match c {
            Component::Normal(seg) => seg.to_str(),
            _ => None,
        })
        .collect::<Option<Vec<_>>>()?;
    Some(segments.join("/"))
}

/// Writes and syncs `data` into the freshly created `temp`, removing it again on failure.
async fn fill_tmp(mut file: fs::File, temp: &Path, data: &[u8]) -> Result<(), StorageError> {
    let written: Result<(), StorageError> = async {
        file.write_all(data).await.context("Write failed")?;
        // Surfaces errors from the background write that sync_all would swallow.
        file.flush().await.context("Write failed")?;
        file.sync_all().await.context("Hardware sync failed")?;
        Ok(())
    }
    .await;
    drop(file);

    if written.is_err() {
        let _ = fs::remove_file(temp).await;
    }
    written
}

fn unique_tmp_path(target: &Path, counter: &AtomicU64) -> PathBuf {
    let counter = counter.fetch_add(1, Ordering::Relaxed);
    let file_name = target.file_name().and_then(|s| s.to_str()).unwrap_or("object");
    target.with_file_name(format!("{file_name}{TMP_MARKER}{counter}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn failed_write_removes_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let temp = dir.path().join(format!("obj{TMP_MARKER}1"));
        std::fs::write(&temp, b"").unwrap();

        // Read-only handle, so the write fails.
        let file = fs::File::open(&temp).await.unwrap();
        let result = fill_tmp(file, &temp, b"payload").await;

        assert!(matches!(result, Err(StorageError::Io { .. })));
        assert!(!temp.exists());
    }

    #[tokio::test]
    async fn successful_write_keeps_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let temp = dir.path().join(format!("obj{TMP_MARKER}2"));
        let file = fs::OpenOptions::new().create_new(true).write(true).open(&temp).await.unwrap();

        fill_tmp(file, &temp, b"payload").await.unwrap();

        assert_eq!(std::fs::read(&temp).unwrap(), b"payload");
    }
}
