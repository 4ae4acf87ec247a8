#![cfg(feature = "server")]

use axum::body::Body;
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{Request, StatusCode};
use axum::routing::get;
use axum::{Extension, Router, middleware};
use cutout_kernel::prelude::{CookieJar, Identity, IdentityResolver};
use cutout_kernel::server::identity::resolve_identity;
use tower::ServiceExt;

const KNOWN: &str = "3f1c2a9e-5b7d-4c1e-9a0f-6d2b8e4c1a53";

fn app() -> Router {
    let resolver = IdentityResolver::new("cutout_id", 31_536_000);
    Router::new()
        .route("/whoami", get(|Extension(id): Extension<Identity>| async move { id.to_string() }))
        .layer(middleware::from_fn_with_state(resolver, resolve_identity))
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn first_contact_issues_exactly_one_cookie() {
    let response =
        app().oneshot(Request::get("/whoami").body(Body::empty()).unwrap()).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let cookies: Vec<_> = response.headers().get_all(SET_COOKIE).iter().collect();
    assert_eq!(cookies.len(), 1);

    let cookie = cookies[0].to_str().unwrap().to_owned();
    let id = body_text(response).await;
    assert!(cookie.starts_with(&format!("cutout_id={id};")));
    assert!(Identity::parse(&id).is_some());
}

#[tokio::test]
async fn replayed_cookie_keeps_identity_without_directive() {
    let request = Request::get("/whoami")
        .header(COOKIE, format!("lang=en; cutout_id={KNOWN}"))
        .body(Body::empty())
        .unwrap();
    let response = app().oneshot(request).await.unwrap();

    assert!(response.headers().get(SET_COOKIE).is_none());
    assert_eq!(body_text(response).await, KNOWN);
}

#[tokio::test]
async fn pre_parsed_jar_is_consulted_first() {
    let mut request = Request::get("/whoami").body(Body::empty()).unwrap();
    request.extensions_mut().insert(CookieJar::new().with("cutout_id", KNOWN));

    let response = app().oneshot(request).await.unwrap();
    assert!(response.headers().get(SET_COOKIE).is_none());
    assert_eq!(body_text(response).await, KNOWN);
}

#[tokio::test]
async fn already_resolved_identity_is_not_reissued() {
    let existing = Identity::generate();
    let mut request = Request::get("/whoami").body(Body::empty()).unwrap();
    request.extensions_mut().insert(existing.clone());

    let response = app().oneshot(request).await.unwrap();
    assert!(response.headers().get(SET_COOKIE).is_none());
    assert_eq!(body_text(response).await, existing.to_string());
}

#[tokio::test]
async fn tampered_cookie_is_replaced() {
    let request = Request::get("/whoami")
        .header(COOKIE, "cutout_id=../../someone-else")
        .body(Body::empty())
        .unwrap();
    let response = app().oneshot(request).await.unwrap();

    assert!(response.headers().get(SET_COOKIE).is_some());
    assert_ne!(body_text(response).await, "../../someone-else");
}

#[tokio::test]
async fn duplicate_cookie_names_keep_the_valid_identity() {
    let request = Request::get("/whoami")
        .header(COOKIE, format!("cutout_id=stale; cutout_id={KNOWN}"))
        .body(Body::empty())
        .unwrap();
    let response = app().oneshot(request).await.unwrap();

    assert!(response.headers().get(SET_COOKIE).is_none());
    assert_eq!(body_text(response).await, KNOWN);
}
