#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Attribute macros shared by every crate in the workspace: error enums with context
//! support, and API models/handlers that document themselves through `utoipa`.
//!
//! Examples are `ignore`d here because a proc-macro crate cannot use its own macros in doctests.

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, ItemFn, ItemStruct, parse_macro_input};

/// Defines a request/response model with the workspace serde policy.
///
/// * Adds `Debug`, `Serialize` and `Deserialize` when missing.
/// * Adds `utoipa::ToSchema` when the consuming crate enables its `server` feature.
/// * Uses `rename_all = "camelCase"` and `deny_unknown_fields` unless told otherwise.
///
/// # Example
///
/// ```rust,ignore
/// use cutout_derive::api_model;
///
/// #[api_model(deny_unknown_fields = false)]
/// pub struct UploadRequest {
///     pub file_b64: Option<String>,
/// }
/// ```
#[proc_macro_attribute]
pub fn api_model(attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemStruct);
    macros::api::expand_api_model(attr.into(), input).into()
}

/// Attaches `utoipa::path` metadata to an axum handler.
///
/// Accepts the regular `utoipa::path` arguments (`get`, `method(get, post)`, `path = "..."`,
/// `responses(...)`, `tag = "..."`).
///
/// # Example
///
/// ```rust,ignore
/// use cutout_derive::api_handler;
///
/// #[api_handler(get, path = "/health", responses((status = OK, body = HealthResponse)))]
/// pub async fn health_handler() -> impl IntoResponse {
///     // ...
/// }
/// ```
#[proc_macro_attribute]
pub fn api_handler(args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    macros::api::expand_api_handler(args.into(), input).into()
}

/// Turns an enum into the workspace error type.
///
/// # Generated Items
///
/// * `#[derive(Debug, thiserror::Error)]` unless already present.
/// * A companion `<Name>Ext` trait adding `.context(...)` to `Result<T, Name>` and to
///   `Result<T, Source>` for every variant that wraps a source error.
/// * `From<Source>` for variants with a `source` field (or a `#[source]`/`#[from]` field).
/// * `From<&'static str>` and `From<String>` when an `Internal` variant exists.
/// * A module-local `format_context` helper for `#[error(...)]` strings.
///
/// # Requirements
///
/// Variants need named fields. Variants with a source must also carry
/// `context: Option<Cow<'static, str>>`.
///
/// # Example
///
/// ```rust,ignore
/// use std::borrow::Cow;
///
/// #[cutout_derive::cutout_error]
/// pub enum StorageError {
///     #[error("I/O failure{}: {source}", format_context(.context))]
///     Io { source: std::io::Error, context: Option<Cow<'static, str>> },
///
///     #[error("Internal fault{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// fn read(path: &Path) -> Result<Vec<u8>, StorageError> {
///     std::fs::read(path).context("Reading object")
/// }
/// ```
#[proc_macro_attribute]
pub fn cutout_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand_derive(input).into()
}
