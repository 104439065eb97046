//! In-process test server shared by the integration tests

#![allow(dead_code)]

use std::time::Duration;

use axum::Router;
use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, StatusCode, Uri, header};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use serde_json::json;

async fn ping() -> Response {
    // no content-type on purpose
    Response::new(Body::from("pong"))
}

async fn echo_query(uri: Uri) -> String {
    uri.query().unwrap_or_default().to_owned()
}

async fn echo_body(body: Bytes) -> Bytes {
    body
}

async fn echo_headers(headers: HeaderMap, body: Bytes) -> Json<serde_json::Value> {
    let value_of = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
    };
    Json(json!({
        "host": value_of(header::HOST),
        "user-agent": value_of(header::USER_AGENT),
        "content-type": value_of(header::CONTENT_TYPE),
        "content-length": value_of(header::CONTENT_LENGTH),
        "x-custom": headers.get("x-custom").and_then(|v| v.to_str().ok()),
        "body": String::from_utf8_lossy(&body),
        "body_len": body.len(),
    }))
}

async fn gbk() -> impl IntoResponse {
    // "中文" in GBK
    (
        [(header::CONTENT_TYPE, "text/plain; charset=gbk")],
        vec![0xD6u8, 0xD0, 0xCE, 0xC4],
    )
}

async fn utf16_with_bom() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; charset=UTF-16BE")],
        vec![0xFEu8, 0xFF, 0x00, b'h', 0x00, b'i'],
    )
}

async fn utf8_with_bom() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        b"\xEF\xBB\xBFhi".to_vec(),
    )
}

async fn json_ok() -> Json<serde_json::Value> {
    Json(json!({"errcode": 0, "errmsg": "ok", "items": [1, 2, 3]}))
}

async fn slow() -> &'static str {
    tokio::time::sleep(Duration::from_secs(5)).await;
    "late"
}

async fn broken_body() -> Response {
    let chunks: Vec<Result<Bytes, std::io::Error>> = vec![
        Ok(Bytes::from_static(b"partial")),
        Err(std::io::Error::other("upstream reset")),
    ];
    Response::new(Body::from_stream(futures::stream::iter(chunks)))
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "missing")
}

pub fn router() -> Router {
    Router::new()
        .route("/ping", get(ping))
        .route("/query", get(echo_query))
        .route("/echo", post(echo_body))
        .route("/headers", post(echo_headers).get(echo_headers))
        .route("/gbk", get(gbk))
        .route("/utf16", get(utf16_with_bom))
        .route("/bom", get(utf8_with_bom))
        .route("/json", get(json_ok))
        .route("/slow", get(slow))
        .route("/missing", get(not_found))
        .route("/broken", get(broken_body))
}

/// Serve the test router on an ephemeral port and return its base URL.
pub async fn serve() -> String {
    env_logger::try_init().ok();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("listener address");
    tokio::spawn(async move {
        axum::serve(listener, router()).await.expect("test server");
    });
    format!("http://{addr}")
}

/// A port nothing listens on.
pub async fn closed_port() -> u16 {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind probe listener");
    listener.local_addr().expect("probe address").port()
}
