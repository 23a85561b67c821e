//! End-to-end tests against the demo server over real sockets.

use std::net::SocketAddr;

use reqwest::header::{CONTENT_TYPE, COOKIE, LOCATION};
use reqwest::StatusCode;

use flash_embed::Message;

mod common;

#[tokio::test]
async fn test_post_redirect_get_shows_messages_once() {
    let addr: SocketAddr = "127.0.0.1:28281".parse().unwrap();
    let shutdown = common::start_demo_server(addr).await;
    let client = common::client();
    let base = format!("http://{}", addr);

    let res = client
        .post(format!("{}/", base))
        .form(&[("category", "error"), ("text", "first\n\n  second  \n")])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(res.headers()[LOCATION], "/");

    let cookies = common::set_cookie_pairs(res.headers());
    assert_eq!(cookies.len(), 2);
    assert!(cookies.iter().all(|(name, _)| name.starts_with("flash_")));

    // Send the cookies in reverse to check that order comes from the names.
    let reversed: Vec<_> = cookies.iter().rev().cloned().collect();
    let res = client
        .get(format!("{}/", base))
        .header(COOKIE, common::cookie_header(&reversed))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let removals = common::set_cookie_pairs(res.headers());
    assert_eq!(removals.len(), 2);
    assert!(removals.iter().all(|(_, value)| value.is_empty()));
    for (name, _) in &cookies {
        assert!(removals.iter().any(|(removed, _)| removed == name));
    }

    let html = res.text().await.unwrap();
    assert!(!html.contains("<flashmessages>"));
    let first = html.find(r#"<div class="alert alert-error">first</div>"#).unwrap();
    let second = html.find(r#"<div class="alert alert-error">second</div>"#).unwrap();
    assert!(first < second);

    // Cookies are gone, so the next page shows nothing.
    let res = client.get(format!("{}/", base)).send().await.unwrap();
    assert!(common::set_cookie_pairs(res.headers()).is_empty());
    assert!(!res.text().await.unwrap().contains(r#"<div class="flash-messages">"#));

    shutdown.trigger();
}

#[tokio::test]
async fn test_json_endpoint_peeks_without_consuming() {
    let addr: SocketAddr = "127.0.0.1:28282".parse().unwrap();
    let shutdown = common::start_demo_server(addr).await;
    let client = common::client();
    let base = format!("http://{}", addr);

    let res = client
        .post(format!("{}/", base))
        .form(&[("category", "info"), ("text", "saved")])
        .send()
        .await
        .unwrap();
    let cookies = common::set_cookie_pairs(res.headers());

    let res = client
        .get(format!("{}/messages.json", base))
        .header(COOKIE, common::cookie_header(&cookies))
        .send()
        .await
        .unwrap();
    assert!(res.headers()[CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("application/json"));
    assert!(common::set_cookie_pairs(res.headers()).is_empty());

    let messages: Vec<Message> = res.json().await.unwrap();
    assert_eq!(messages, vec![Message::info("saved")]);

    shutdown.trigger();
}

#[tokio::test]
async fn test_corrupt_cookie_is_expired_and_ignored() {
    let addr: SocketAddr = "127.0.0.1:28283".parse().unwrap();
    let shutdown = common::start_demo_server(addr).await;
    let client = common::client();

    let res = client
        .get(format!("http://{}/", addr))
        .header(COOKIE, "flash_00000000000000000001=not-base64!; session=abc")
        .send()
        .await
        .unwrap();

    let removals = common::set_cookie_pairs(res.headers());
    assert_eq!(
        removals,
        vec![("flash_00000000000000000001".to_string(), String::new())]
    );
    let html = res.text().await.unwrap();
    assert!(!html.contains(r#"<div class="flash-messages">"#));
    assert!(!html.contains("<flashmessages>"));

    shutdown.trigger();
}
