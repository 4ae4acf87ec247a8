//! Paths, names and tags that more than one crate needs to agree on.

/// The single asset endpoint.
pub const IMAGES_PATH: &str = "/api/images";
/// Public retrieval route for stored objects; `{*key}` follows.
pub const FILES_PATH: &str = "/files";
/// OpenAPI/Scalar documentation route.
pub const DOCS_PATH: &str = "/api";
pub const HEALTH_PATH: &str = "/health";

/// Every asset key starts with this segment.
pub const KEY_PREFIX: &str = "images/";
/// Extension of every stored asset.
pub const ASSET_EXTENSION: &str = "png";
pub const ASSET_CONTENT_TYPE: &str = "image/png";

pub const IDENTITY_COOKIE: &str = "cutout_id";
/// One year.
pub const IDENTITY_MAX_AGE_SECS: u64 = 31_536_000;

pub const ASSETS_TAG: &str = "Assets";
pub const SYSTEM_TAG: &str = "System";
