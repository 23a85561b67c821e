//! Content classification of responses served over real connections.

use std::net::SocketAddr;

use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use bytes::Bytes;
use reqwest::header::COOKIE;

use flash_embed::flash::codec;
use flash_embed::http::FlashLayer;
use flash_embed::render::FnRenderer;
use flash_embed::Message;

mod common;

fn bracket_layer() -> FlashLayer {
    FlashLayer::with_renderer(FnRenderer(|messages: &[Message]| {
        let texts: Vec<&str> = messages.iter().map(|m| m.text.as_str()).collect();
        Bytes::from(format!("[{}]", texts.join(",")))
    }))
}

fn pending_cookie() -> String {
    let value = codec::encode(&Message::info("hello")).unwrap();
    format!("{}={}", codec::cookie_name(&codec::sequence_key()), value)
}

async fn streamed_html() -> Response {
    let chunks = ["<!doctype html><html>", "<body><p>text</p>", "</body></html>"];
    let stream = futures_util::stream::iter(
        chunks
            .into_iter()
            .map(|c| Ok::<_, std::io::Error>(Bytes::from_static(c.as_bytes()))),
    );
    Response::new(Body::from_stream(stream))
}

async fn untyped_json() -> Response {
    Response::new(Body::from(r#"{"content":"<body></body>"}"#))
}

async fn typed_html() -> Response {
    Response::builder()
        .header(CONTENT_TYPE, "text/html")
        .body(Body::from("<flashmessages><p>x</p>"))
        .unwrap()
}

fn app() -> Router {
    Router::new()
        .route("/stream", get(streamed_html))
        .route("/json", get(untyped_json))
        .route("/typed", get(typed_html))
}

#[tokio::test]
async fn test_untyped_streamed_html_is_sniffed_and_rewritten() {
    let addr: SocketAddr = "127.0.0.1:28381".parse().unwrap();
    let shutdown = common::start_app(addr, app(), bracket_layer()).await;

    let res = common::client()
        .get(format!("http://{}/stream", addr))
        .header(COOKIE, pending_cookie())
        .send()
        .await
        .unwrap();

    assert_eq!(common::set_cookie_pairs(res.headers()).len(), 1);
    assert_eq!(
        res.text().await.unwrap(),
        "<!doctype html><html><body><p>text</p>[hello]</body></html>"
    );

    shutdown.trigger();
}

#[tokio::test]
async fn test_untyped_json_passes_through() {
    let addr: SocketAddr = "127.0.0.1:28382".parse().unwrap();
    let shutdown = common::start_app(addr, app(), bracket_layer()).await;

    let res = common::client()
        .get(format!("http://{}/json", addr))
        .header(COOKIE, pending_cookie())
        .send()
        .await
        .unwrap();

    assert!(common::set_cookie_pairs(res.headers()).is_empty());
    assert_eq!(res.text().await.unwrap(), r#"{"content":"<body></body>"}"#);

    shutdown.trigger();
}

#[tokio::test]
async fn test_declared_html_fills_placeholder() {
    let addr: SocketAddr = "127.0.0.1:28383".parse().unwrap();
    let shutdown = common::start_app(addr, app(), bracket_layer()).await;

    let res = common::client()
        .get(format!("http://{}/typed", addr))
        .header(COOKIE, pending_cookie())
        .send()
        .await
        .unwrap();

    assert_eq!(res.text().await.unwrap(), "[hello]<p>x</p>");

    shutdown.trigger();
}
