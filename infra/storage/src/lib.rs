//! A sandboxed, filesystem-backed object store.
//!
//! Objects are addressed by `/`-separated keys and stored one file per key below a single
//! root directory. All examples use temporary directories.
//!
//! # Core Features
//!
//! - **Sandbox Security**: keys are validated segment by segment (no `..`, no absolute paths)
//!   and resolved paths are checked against the canonical root, so symlinks cannot escape.
//! - **Atomic Writes**: unique temp write + `fsync` + `rename`; readers never see partial data.
//! - **Prefix Listing**: [`Storage::list`] walks only the directory a prefix points to.
//! - **Self-Healing**: stale temporary files are purged when the store connects.
//!
//! # Examples
//!
//! ```rust
//! use cutout_storage::{Storage, StorageError};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), StorageError> {
//!     # let tmp = tempfile::tempdir().unwrap();
//!     # let root = tmp.path().join("data");
//!     let storage = Storage::builder().root(&root).create(true).connect().await?;
//!
//!     storage.put("images/a/1-x.png", b"a").await?;
//!     storage.put("images/b/1-y.png", b"b").await?;
//!
//!     let only_a = storage.list("images/a/").await?;
//!     assert_eq!(only_a.len(), 1);
//!     assert_eq!(storage.read("images/b/1-y.png").await?, b"b");
//!     Ok(())
//! }
//! ```

mod builder;
mod engine;
mod error;
mod maintenance;
mod security;

pub use builder::StorageBuilder;
pub use engine::{ObjectMeta, Storage};
pub use error::{StorageError, StorageErrorExt};
