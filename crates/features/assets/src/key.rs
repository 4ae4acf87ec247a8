//! Asset key scheme: `images/{identity}/{millis}-{suffix}.png`.
//!
//! Keys bind an object to exactly one identity. [`owned_key`] is the inverse used before any
//! delete: it recovers the key from a key or URL and checks the identity segment.

use cutout_domain::constants::{ASSET_EXTENSION, KEY_PREFIX};
use cutout_kernel::base36_nanoid;
use cutout_kernel::security::identity::Identity;
use std::fmt;

/// A storage key minted for one identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetKey(String);

impl AssetKey {
    /// Mints a fresh key from the wall clock and an 8 character base36 suffix.
    #[must_use]
    pub fn mint(identity: &Identity) -> Self {
        Self::derive(identity, chrono::Utc::now().timestamp_millis(), &base36_nanoid!())
    }

    /// Builds a key from explicit parts.
    #[must_use]
    pub fn derive(identity: &Identity, millis: i64, suffix: &str) -> Self {
        Self(format!("{KEY_PREFIX}{identity}/{millis}-{suffix}.{ASSET_EXTENSION}"))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for AssetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for AssetKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// The listing prefix of everything `identity` owns.
#[must_use]
pub fn owner_prefix(identity: &Identity) -> String {
    format!("{KEY_PREFIX}{identity}/")
}

/// Cuts the candidate key out of a bare key or a full URL.
///
/// The candidate starts at the first `images/` and ends before any query or fragment.
#[must_use]
pub fn extract_key(key_or_url: &str) -> Option<&str> {
    let start = key_or_url.find(KEY_PREFIX)?;
    let candidate = &key_or_url[start..];
    let end = candidate.find(['?', '#']).unwrap_or(candidate.len());
    Some(&candidate[..end])
}

/// Returns the normalized key when `key_or_url` points into `identity`'s namespace.
///
/// Candidates with `.`/`..` or empty segments, backslashes, or no object name are never owned.
#[must_use]
pub fn owned_key<'a>(key_or_url: &'a str, identity: &Identity) -> Option<&'a str> {
    let candidate = extract_key(key_or_url)?;
    let name = candidate.strip_prefix(KEY_PREFIX)?.strip_prefix(identity.as_str())?.strip_prefix('/')?;

    if name.is_empty() || candidate.contains('\\') {
        return None;
    }
    if name.split('/').any(|segment| matches!(segment, "" | "." | "..")) {
        return None;
    }

    Some(candidate)
}

/// Ownership check: does `key_or_url` belong to `identity`?
#[must_use]
pub fn owner_of(key_or_url: &str, identity: &Identity) -> bool {
    owned_key(key_or_url, identity).is_some()
}
