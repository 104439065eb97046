use axum::Router;
use axum::body::Bytes;
use axum::http::{HeaderMap, header};
use axum::response::{IntoResponse, Json};
use axum::routing::{get, post};
use serde::Deserialize;
use serde_json::{Value, json};
use wxhttp::{ApiClient, ApiError, ApiOptions, ApiResult, Form, HttpClient};

async fn echo(headers: HeaderMap, body: Bytes) -> Json<Value> {
    let received: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    Json(json!({
        "errcode": 0,
        "errmsg": "ok",
        "content_type": headers.get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()),
        "received": received,
        "body_len": body.len(),
    }))
}

async fn rejected() -> Json<Value> {
    Json(json!({"errcode": 40001, "errmsg": "invalid credential"}))
}

async fn rate_limited() -> Json<Value> {
    Json(json!({"errcode": "45009", "errmsg": "reach max api daily quota limit"}))
}

async fn null_errcode() -> Json<Value> {
    Json(json!({"errcode": null, "errmsg": "ok", "ticket": "T"}))
}

async fn token() -> Json<Value> {
    Json(json!({"access_token": "ACCESS", "expires_in": 7200}))
}

async fn media() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "image/png")], b"\x89PNG".to_vec())
}

async fn not_json() -> &'static str {
    "<html>gateway error</html>"
}

async fn serve() -> String {
    let app = Router::new()
        .route("/cgi-bin/echo", post(echo))
        .route("/cgi-bin/rejected", get(rejected))
        .route("/cgi-bin/quota", get(rate_limited))
        .route("/cgi-bin/ticket", get(null_errcode))
        .route("/cgi-bin/token", get(token))
        .route("/cgi-bin/media", get(media).post(echo))
        .route("/cgi-bin/html", get(not_json));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("listener address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("test server");
    });
    format!("http://{addr}")
}

async fn api() -> ApiClient {
    let _ = env_logger::builder().is_test(true).try_init();
    ApiClient::new(HttpClient::new()).with_base_url(serve().await)
}

#[tokio::test]
async fn test_payload_sent_as_json() {
    let api = api().await;

    let result = api
        .call(
            ApiOptions::post("/cgi-bin/echo")
                .header(header::CONTENT_TYPE, "text/plain".parse().expect("header"))
                .data(&json!({"a": 1})),
        )
        .await
        .expect("errcode 0 resolves");

    assert!(result.is_ok());
    assert_eq!(result.errmsg, "ok");
    assert_eq!(result.data["content_type"], "application/json; charset=utf-8");
    assert_eq!(result.data["received"], json!({"a": 1}));
}

#[tokio::test]
async fn test_no_payload_sends_empty_body() {
    let api = api().await;

    let result = api
        .call(ApiOptions::post("/cgi-bin/echo"))
        .await
        .expect("errcode 0 resolves");
    assert_eq!(result.data["body_len"], 0);
    assert_eq!(result.data["content_type"], Value::Null);
}

#[tokio::test]
async fn test_errcode_rejects_by_default() {
    let api = api().await;

    let err = api
        .call(ApiOptions::get("/cgi-bin/rejected"))
        .await
        .expect_err("errcode 40001 rejects");
    assert_eq!(err.errcode(), Some(40001));
    let failure = err.failure().expect("domain failure");
    assert_eq!(failure.errmsg, "invalid credential");
    assert!(matches!(err, ApiError::Api(_)));
}

#[tokio::test]
async fn test_errcode_returned_when_not_throwing() {
    let api = api().await;

    let result = api
        .call(ApiOptions::get("/cgi-bin/rejected").throw_on_error(false))
        .await
        .expect("soft failure resolves");
    assert_eq!(result.errcode, 40001);
    assert_eq!(result.errmsg, "invalid credential");
    assert!(!result.is_ok());
}

#[tokio::test]
async fn test_string_errcode_returned_when_not_throwing() {
    let api = api().await;

    let result = api
        .call(ApiOptions::get("/cgi-bin/quota").throw_on_error(false))
        .await
        .expect("soft failure resolves");
    assert_eq!(result.errcode, 45009);
    assert_eq!(result.errmsg, "reach max api daily quota limit");

    let err = api
        .call(ApiOptions::get("/cgi-bin/quota"))
        .await
        .expect_err("string errcode rejects");
    assert_eq!(err.errcode(), Some(45009));
}

#[tokio::test]
async fn test_null_errcode_is_success() {
    let api = api().await;

    let result = api
        .call(ApiOptions::get("/cgi-bin/ticket"))
        .await
        .expect("null errcode resolves");
    assert!(result.is_ok());
    assert_eq!(result.errmsg, "ok");
    assert_eq!(result.data["ticket"], "T");
}

#[tokio::test]
async fn test_typed_result() {
    #[derive(Debug, Deserialize)]
    struct Token {
        access_token: String,
        expires_in: u64,
    }

    let api = api().await;
    let result: ApiResult<Token> = api
        .request(ApiOptions::get("/cgi-bin/token").query("grant_type", "client_credential"))
        .await
        .expect("token");
    assert_eq!(result.errcode, 0);
    assert_eq!(result.data.access_token, "ACCESS");
    assert_eq!(result.data.expires_in, 7200);
}

#[tokio::test]
async fn test_base_url_override_per_call() {
    let real = serve().await;
    let api = ApiClient::new(HttpClient::new()).with_base_url("http://127.0.0.1:1");

    let result = api
        .call(ApiOptions::get("/cgi-bin/token").base_url(real))
        .await
        .expect("override reaches the live server");
    assert_eq!(result.data["access_token"], "ACCESS");
}

#[tokio::test]
async fn test_non_json_body_is_http_error() {
    let api = api().await;

    let err = api
        .call(ApiOptions::get("/cgi-bin/html"))
        .await
        .expect_err("html is not json");
    match err {
        ApiError::Http(e) => assert!(e.is_decode()),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_raw_download() {
    let api = api().await;

    let mut res = api
        .raw(ApiOptions::get("/cgi-bin/media"))
        .await
        .expect("raw response");
    assert_eq!(res.headers()["content-type"], "image/png");
    assert_eq!(&res.read_as_buffer().await.expect("bytes")[..], b"\x89PNG");
}

#[tokio::test]
async fn test_raw_multipart_upload() {
    let api = api().await;
    let form = Form::new().text("type", "image");
    let boundary = form.boundary().to_owned();

    let mut res = api
        .raw(ApiOptions::post("/cgi-bin/media").form(form))
        .await
        .expect("upload");
    let seen: Value = res.read_as_json(None).await.expect("json");
    assert_eq!(
        seen["content_type"],
        format!("multipart/form-data; boundary={boundary}")
    );
}
