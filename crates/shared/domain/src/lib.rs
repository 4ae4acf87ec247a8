//! # Domain Models
//!
//! Pure data shared by every crate: the configuration tree, wire constants and the
//! feature slice registry. Only `serde` is allowed here; no I/O or networking.

pub mod config;
pub mod constants;
pub mod registry;
