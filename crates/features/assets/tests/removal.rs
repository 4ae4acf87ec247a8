use axum::Router;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, extract::State};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use cutout_assets::ports::BackgroundRemover;
use cutout_assets::{AssetError, RemoveBgClient};
use cutout_domain::config::RemovalConfig;
use serde_json::{Value, json};
use tokio::net::TcpListener;

const KEY: &str = "test-key";

/// Reverses the decoded image when the key matches, answers like remove.bg otherwise.
async fn fake_removebg(State(expected): State<&'static str>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if headers.get("x-api-key").and_then(|v| v.to_str().ok()) != Some(expected) {
        let errors = json!({ "errors": [{ "title": "API Key invalid", "code": "auth_failed" }] });
        return (StatusCode::FORBIDDEN, Json(errors)).into_response();
    }
    if body["size"] != "auto" {
        return (StatusCode::BAD_REQUEST, "size must be auto").into_response();
    }

    let Some(mut image) = body["image_file_b64"].as_str().and_then(|b| STANDARD.decode(b).ok()) else {
        return (StatusCode::BAD_REQUEST, "image_file_b64 missing").into_response();
    };
    image.reverse();
    ([(header::CONTENT_TYPE, "image/png")], image).into_response()
}

async fn spawn_upstream() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new().route("/v1.0/removebg", post(fake_removebg)).with_state(KEY);
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    format!("http://{addr}/v1.0/removebg")
}

fn client(endpoint: String, api_key: &str) -> RemoveBgClient {
    RemoveBgClient::new(&RemovalConfig { endpoint, api_key: api_key.to_owned(), timeout_secs: 5 })
        .unwrap()
}

#[tokio::test]
async fn successful_removal_returns_body_bytes() {
    let endpoint = spawn_upstream().await;

    let out = client(endpoint, KEY).remove(b"abc".to_vec()).await.unwrap();
    assert_eq!(out, b"cba");
}

#[tokio::test]
async fn rejected_request_carries_upstream_text() {
    let endpoint = spawn_upstream().await;

    let err = client(endpoint, "wrong").remove(b"abc".to_vec()).await.unwrap_err();
    assert!(matches!(err, AssetError::Upstream { .. }));
    assert_eq!(err.details(), "API Key invalid");
}

#[tokio::test]
async fn unreachable_service_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client(format!("http://{addr}/v1.0/removebg"), KEY).remove(b"abc".to_vec()).await.unwrap_err();
    assert!(matches!(err, AssetError::Transport { .. }));
}
