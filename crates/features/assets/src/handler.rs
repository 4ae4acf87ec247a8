//! HTTP surface of the asset slice.

use crate::Assets;
use crate::action::{Action, route};
use crate::error::AssetError;
use crate::model::{
    AssetRecord, DeleteResponse, ErrorResponse, ImageQuery, ListResponse, UploadRequest,
    UploadResponse,
};
use axum::Json;
use axum::body::Bytes;
use axum::extract::rejection::{BytesRejection, QueryRejection};
use axum::extract::{DefaultBodyLimit, Extension, Path, Query, State};
use axum::http::{Method, StatusCode};
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use axum::routing::{any, get};
use cutout_derive::api_handler;
use cutout_domain::constants::{
    ASSET_CONTENT_TYPE, ASSETS_TAG, FILES_PATH, IMAGES_PATH, KEY_PREFIX,
};
use cutout_kernel::security::identity::Identity;
use cutout_kernel::server::ApiState;
use tracing::debug;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;

#[derive(OpenApi)]
#[openapi(
    paths(handle_images),
    components(schemas(ListResponse, DeleteResponse, AssetRecord, ErrorResponse))
)]
struct AssetsDoc;

/// Routes of the asset slice.
///
/// `/api/images` is mounted for every method so that unsupported ones get the same JSON
/// 405 as action/method mismatches. Request bodies are capped at `max_body_bytes`.
pub fn router(max_body_bytes: usize) -> OpenApiRouter<ApiState> {
    OpenApiRouter::with_openapi(AssetsDoc::openapi())
        .route(IMAGES_PATH, any(handle_images))
        .route(&format!("{FILES_PATH}/{{*key}}"), get(serve_file))
        .layer(DefaultBodyLimit::max(max_body_bytes))
}

/// Query failures are only reported once the method itself is known to be supported.
fn parse_query(
    method: &Method,
    query: Result<Query<ImageQuery>, QueryRejection>,
) -> Result<(Action, ImageQuery), AssetError> {
    match query {
        Ok(Query(query)) => Ok((route(method.as_str(), query.action.as_deref())?, query)),
        Err(rejection) => {
            route(method.as_str(), None)?;
            Err(AssetError::InvalidInput {
                message: rejection.body_text().into(),
                context: Some("Malformed query string".into()),
            })
        },
    }
}

fn upload_body(body: Result<Bytes, BytesRejection>) -> Result<Bytes, AssetError> {
    body.map_err(|rejection| {
        let message = rejection.body_text().into();
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AssetError::PayloadTooLarge { message, context: None }
        } else {
            AssetError::InvalidInput { message, context: Some("Unreadable request body".into()) }
        }
    })
}

fn assets(state: &ApiState) -> Result<&Assets, AssetError> {
    state.try_get_slice::<Assets>().map_err(|e| AssetError::from(e.to_string()))
}

/// Single endpoint for upload, list and delete, scoped to the caller's identity cookie.
#[api_handler(
    method(get, post, delete),
    path = "/api/images",
    params(ImageQuery),
    request_body(content = UploadRequest, description = "Upload only", content_type = "application/json"),
    responses(
        (status = OK, description = "Upload result; list returns ListResponse, delete returns DeleteResponse", body = UploadResponse),
        (status = BAD_REQUEST, description = "Missing or malformed input", body = ErrorResponse),
        (status = PAYLOAD_TOO_LARGE, description = "Upload body exceeds the configured limit", body = ErrorResponse),
        (status = FORBIDDEN, description = "Target belongs to another identity", body = ErrorResponse),
        (status = METHOD_NOT_ALLOWED, description = "Unknown action or method mismatch", body = ErrorResponse),
        (status = INTERNAL_SERVER_ERROR, description = "Transform or storage failure", body = ErrorResponse),
        (status = BAD_GATEWAY, description = "Background removal failed", body = ErrorResponse),
    ),
    tag = ASSETS_TAG,
)]
pub async fn handle_images(
    State(state): State<ApiState>,
    Extension(identity): Extension<Identity>,
    method: Method,
    query: Result<Query<ImageQuery>, QueryRejection>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, AssetError> {
    let (action, query) = parse_query(&method, query)?;
    let assets = assets(&state)?;
    debug!(identity = %identity, action = %action, "Dispatching asset request");

    let response = match action {
        Action::Upload => {
            let body = upload_body(body)?;
            let stored = assets.pipeline().upload(&identity, &body).await?;
            Json(UploadResponse::from(stored)).into_response()
        },
        Action::List => {
            let items = assets.owned().list_owned(&identity).await?;
            Json(ListResponse { items }).into_response()
        },
        Action::Delete => {
            assets.owned().delete_owned(&identity, query.target()).await?;
            Json(DeleteResponse { success: true }).into_response()
        },
    };

    Ok(response)
}

/// Public retrieval of a stored object.
async fn serve_file(
    State(state): State<ApiState>,
    Path(key): Path<String>,
) -> Result<Response, AssetError> {
    if !key.starts_with(KEY_PREFIX) {
        return Err(AssetError::NotFound { message: key.into(), context: None });
    }

    let bytes = assets(&state)?.store().read(&key).await?;

    Ok((
        [(CONTENT_TYPE, ASSET_CONTENT_TYPE), (CACHE_CONTROL, "public, max-age=31536000, immutable")],
        bytes,
    )
        .into_response())
}
