use axum::Router;
use cutout::domain::constants::DOCS_PATH;
use cutout::kernel::prelude::ApiState;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_scalar::{Scalar, Servable};

#[derive(OpenApi)]
#[openapi(
    info(title = "Cutout", description = "Background removal for anonymous callers"),
    tags(
        (name = "Assets", description = "Upload, list and delete own images"),
        (name = "System", description = "Operational endpoints"),
    )
)]
struct ApiDoc;

pub(crate) fn init(state: ApiState) -> Router {
    let (openapi_routes, api_doc) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .merge(cutout::server::router::app_router(&state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
        .split_for_parts();

    let scalar_routes = Scalar::with_url(DOCS_PATH, api_doc);

    Router::new().merge(openapi_routes).merge(scalar_routes)
}
