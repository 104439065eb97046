mod common;

use bytes::Bytes;
use serde::Deserialize;
use wxhttp_client::stream::copy_to;
use wxhttp_client::{HttpClient, RequestOptions, Response, StatusCode};

async fn get(path: &str) -> Response {
    let base = common::serve().await;
    HttpClient::new()
        .execute(RequestOptions::get(path).base_url(base.as_str()))
        .await
        .expect("request")
}

#[tokio::test]
async fn test_named_charset_from_content_type() {
    let mut res = get("/gbk").await;
    assert_eq!(res.charset(None), "gbk");
    assert_eq!(res.read_as_string(None).await.expect("decode"), "中文");
}

#[tokio::test]
async fn test_named_charset_strips_bom() {
    let mut res = get("/utf16").await;
    assert_eq!(res.read_as_string(None).await.expect("decode"), "hi");
}

#[tokio::test]
async fn test_raw_charset_keeps_bom() {
    let mut res = get("/bom").await;
    assert_eq!(res.read_as_string(None).await.expect("decode"), "\u{FEFF}hi");
}

#[tokio::test]
async fn test_override_wins_over_header() {
    let mut res = get("/gbk").await;
    assert_eq!(res.read_as_string(Some("hex")).await.expect("decode"), "d6d0cec4");
}

#[tokio::test]
async fn test_read_as_json_matches_direct_parse() {
    #[derive(Debug, Deserialize, PartialEq)]
    struct Envelope {
        errcode: i64,
        errmsg: String,
        items: Vec<u32>,
    }

    let mut res = get("/json").await;
    let body: Envelope = res.read_as_json(None).await.expect("json");
    assert_eq!(
        body,
        Envelope {
            errcode: 0,
            errmsg: "ok".to_owned(),
            items: vec![1, 2, 3],
        }
    );
}

#[tokio::test]
async fn test_second_materialization_fails() {
    let mut res = get("/json").await;
    res.read_as_string(None).await.expect("first read");

    let err = res.read_as_json::<serde_json::Value>(None).await.expect_err("already read");
    assert!(err.is_consumed());
    assert!(res.read_as_buffer().await.expect_err("already read").is_consumed());
}

#[tokio::test]
async fn test_body_stream_piped_with_copy_to() {
    let mut res = get("/ping").await;
    let mut sink: Vec<Bytes> = Vec::new();
    let copied = copy_to(res.bytes_stream().expect("stream"), &mut sink)
        .await
        .expect("copy");

    assert_eq!(copied, 4);
    assert_eq!(sink.concat(), b"pong");
    assert!(res.is_consumed());
}

#[tokio::test]
async fn test_error_for_status() {
    let res = get("/missing").await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let err = res.error_for_status().expect_err("404");
    assert!(err.is_status());
    assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));

    let res = get("/ping").await;
    assert!(res.error_for_status().is_ok());
}

#[tokio::test]
async fn test_content_length_exposed() {
    let mut res = get("/ping").await;
    assert_eq!(res.content_length(), Some(4));
    assert_eq!(res.read_as_buffer().await.expect("read").len(), 4);
}

#[tokio::test]
async fn test_body_failure_mid_read() {
    let mut res = get("/broken").await;
    assert_eq!(res.status(), 200);

    let err = res.read_as_string(None).await.expect_err("body breaks off");
    assert!(err.is_body());
    assert!(res.is_consumed());

    let err = res.read_as_buffer().await.expect_err("already taken");
    assert!(err.is_consumed());
}
