use crate::error::StorageError;
use std::path::{Path, PathBuf};

/// Marker embedded in in-flight temporary file names.
pub(crate) const TMP_MARKER: &str = ".cutouttmp.";

/// Checks that `key` is a plain relative object key (`a/b/c.png`).
///
/// Keys are never normalized: `.`/`..` segments, empty segments, absolute paths and
/// backslashes are rejected outright so a key maps to exactly one file.
pub(crate) fn validate_key(key: &str) -> Result<(), StorageError> {
    if key.is_empty() {
        return Err(invalid(key, "Key cannot be empty"));
    }
    if key.starts_with('/') || key.contains('\\') || key.contains('\0') {
        return Err(StorageError::PathTraversalAttempt {
            message: key.to_owned().into(),
            context: Some("Key must be a relative '/'-separated path".into()),
        });
    }

    for segment in key.split('/') {
        match segment {
            "" => return Err(invalid(key, "Key contains an empty segment")),
            "." | ".." => {
                return Err(StorageError::PathTraversalAttempt {
                    message: key.to_owned().into(),
                    context: Some("Key attempted to escape sandbox via dot segments".into()),
                });
            },
            s if s.contains(TMP_MARKER) => {
                return Err(invalid(key, "Key collides with the temporary file marker"));
            },
            _ => {},
        }
    }

    Ok(())
}

/// Validates a listing prefix. Everything up to the last `/` must be a valid key path.
pub(crate) fn validate_prefix(prefix: &str) -> Result<(), StorageError> {
    match prefix.rsplit_once('/') {
        Some((dir, _)) => validate_key(dir),
        None if prefix.contains('\\') => Err(invalid(prefix, "Prefix contains a backslash")),
        None => Ok(()),
    }
}

/// Maps a validated key onto the sandbox and guards against symlink escapes.
pub(crate) fn resolve_key(root: &Path, key: &str) -> Result<PathBuf, StorageError> {
    validate_key(key)?;
    let joined = key.split('/').fold(root.to_path_buf(), |path, seg| path.join(seg));

    match joined.canonicalize() {
        Ok(canonical) => validate_canonical(root, canonical),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => validate_ancestors(root, &joined),
        Err(e) => Err(StorageError::Io { source: e, context: None }),
    }
}

fn invalid(key: &str, reason: &'static str) -> StorageError {
    StorageError::InvalidKey { message: key.to_owned().into(), context: Some(reason.into()) }
}

fn validate_canonical(root: &Path, canonical: PathBuf) -> Result<PathBuf, StorageError> {
    if canonical.starts_with(root) {
        Ok(canonical)
    } else {
        Err(StorageError::PathTraversalAttempt {
            message: canonical.display().to_string().into(),
            context: Some("Object resolves outside the sandbox".into()),
        })
    }
}

/// Validates a path that does not exist yet through its first existing ancestor.
///
/// The ancestor is canonicalized, so a symlinked directory pointing outside the root is
/// caught even before the object is created.
fn validate_ancestors(root: &Path, joined: &Path) -> Result<PathBuf, StorageError> {
    let mut current = joined.parent();

    while let Some(path) = current {
        if path == root {
            return Ok(joined.to_path_buf());
        }

        if path.exists() {
            return match path.canonicalize() {
                Ok(canonical) if canonical.starts_with(root) => Ok(joined.to_path_buf()),
                Ok(canonical) => Err(StorageError::PathTraversalAttempt {
                    message: canonical.display().to_string().into(),
                    context: Some("Existing parent directory is a symlink outside sandbox".into()),
                }),
                Err(e) => Err(StorageError::Io {
                    source: e,
                    context: Some("Failed to verify parent directory".into()),
                }),
            };
        }

        current = path.parent();
    }

    Err(StorageError::PathTraversalAttempt {
        message: joined.display().to_string().into(),
        context: Some("No valid parent directory found within sandbox".into()),
    })
}
