//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use reqwest::header::{HeaderMap, SET_COOKIE};
use tokio::net::TcpListener;

use flash_embed::http::{DemoServer, FlashLayer};
use flash_embed::{AppConfig, Shutdown};

/// Start the demo server on `addr`. Dropping the returned handle leaves the
/// server running; call `trigger` to stop it.
#[allow(dead_code)]
pub async fn start_demo_server(addr: SocketAddr) -> Shutdown {
    let mut config = AppConfig::default();
    config.listener.bind_address = addr.to_string();

    let server = DemoServer::new(&config, FlashLayer::new());
    serve(addr, |listener, shutdown| async move {
        let _ = server.run(listener, shutdown).await;
    })
    .await
}

/// Serve an arbitrary router behind the flash layer.
#[allow(dead_code)]
pub async fn start_app(addr: SocketAddr, app: Router, layer: FlashLayer) -> Shutdown {
    let app = app.layer(layer);
    serve(addr, |listener, mut shutdown| async move {
        let _ = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await;
    })
    .await
}

async fn serve<F, Fut>(addr: SocketAddr, run: F) -> Shutdown
where
    F: FnOnce(TcpListener, tokio::sync::broadcast::Receiver<()>) -> Fut,
    Fut: std::future::Future<Output = ()> + Send + 'static,
{
    let shutdown = Shutdown::new();
    let listener = TcpListener::bind(addr).await.unwrap();
    tokio::spawn(run(listener, shutdown.subscribe()));
    tokio::time::sleep(Duration::from_millis(50)).await;
    shutdown
}

/// Client that reports redirects instead of following them.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap()
}

/// `name=value` pairs of every Set-Cookie header, attributes stripped.
pub fn set_cookie_pairs(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(';').next())
        .filter_map(|pair| pair.split_once('='))
        .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
        .collect()
}

/// Render pairs as a request `Cookie` header value.
#[allow(dead_code)]
pub fn cookie_header(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .map(|(name, value)| format!("{}={}", name, value))
        .collect::<Vec<_>>()
        .join("; ")
}
