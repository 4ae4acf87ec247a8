//! Kernel utilities shared across slices.
//! Keep this crate lightweight: config loading, the anonymous identity model and, behind the
//! `server` feature, the axum plumbing every slice mounts into.
//!
//! ## ID generation
//! Use `base36_nanoid!` for short lowercase suffixes that are safe in object keys and URLs:
//! ```rust
//! # use cutout_kernel::base36_nanoid;
//! let suffix = base36_nanoid!();
//! assert_eq!(suffix.len(), 8);
//! assert!(suffix.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
//! ```
//!
//! ## Config loading
//! ```rust,no_run
//! use cutout_kernel::config::load_config;
//! use cutout_kernel::domain::config::ApiConfig;
//!
//! let cfg: ApiConfig = load_config(None::<&str>).unwrap();
//! ```

pub mod config;
pub mod prelude;
pub mod security;
#[cfg(feature = "server")]
pub mod server;

/// Lowercase base36: `0-9a-z`.
pub const BASE36_ALPHABET: &[char; 36] = &[
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i',
    'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
];

pub use cutout_domain as domain;
pub use nanoid::nanoid;

/// Generates a random lowercase base36 `NanoID` (8 characters unless a size is given).
#[macro_export]
macro_rules! base36_nanoid {
    () => {
        $crate::nanoid!(8, $crate::BASE36_ALPHABET)
    };
    ($size:expr) => {
        $crate::nanoid!($size, $crate::BASE36_ALPHABET)
    };
}
