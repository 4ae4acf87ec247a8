use axum::http::header;
use axum::{Json, response::IntoResponse};
use cutout_derive::{api_handler, api_model};
use cutout_domain::constants::SYSTEM_TAG;
use std::sync::LazyLock;
use std::time::Instant;

#[api_model]
/// Liveness report.
struct HealthResponse {
    /// Always `up` while the process serves requests
    status: &'static str,
    /// Crate version of the running binary
    version: &'static str,
    /// Seconds since the first health probe
    uptime: u64,
}

static START_TIME: LazyLock<Instant> = LazyLock::new(Instant::now);

#[api_handler(
    get,
    path = "/health",
    responses((status = OK, description = "Service is alive", body = HealthResponse)),
    tag = SYSTEM_TAG,
)]
pub(super) async fn health_handler() -> impl IntoResponse {
    let body = HealthResponse {
        status: "up",
        version: env!("CARGO_PKG_VERSION"),
        uptime: START_TIME.elapsed().as_secs(),
    };

    ([(header::CACHE_CONTROL, "no-store")], Json(body))
}
