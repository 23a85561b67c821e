//! Flash message demo server.
//!
//! Serves a form at `/`. Each line submitted becomes a flash message that is
//! shown once, on the page the browser is redirected to.
//!
//! The configuration file is taken from the first argument, then from
//! `FLASH_EMBED_CONFIG`; without either the built-in defaults are used.

use std::path::PathBuf;

use tokio::net::TcpListener;

use flash_embed::config::{load_config, AppConfig, TemplateWatcher};
use flash_embed::http::{DemoServer, FlashLayer};
use flash_embed::lifecycle::{shutdown_signal, Shutdown};
use flash_embed::observability::{logging, metrics};

const CONFIG_ENV: &str = "FLASH_EMBED_CONFIG";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var(CONFIG_ENV).ok())
        .map(PathBuf::from);

    let config = match &config_path {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };

    logging::init(&config.observability);

    tracing::info!("flash-demo v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        config = ?config_path,
        bind_address = %config.listener.bind_address,
        template = ?config.flash.template_path,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let flash = FlashLayer::from_config(&config.flash)?;

    // Dropping the watcher stops delivery, so it lives until main returns.
    let _watcher = match (&config.flash.template_path, config.flash.watch_template) {
        (Some(path), true) => Some(TemplateWatcher::new(path, flash.renderer().clone()).run()?),
        _ => None,
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = DemoServer::new(&config, flash);
    let server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    shutdown_signal().await;
    shutdown.trigger();

    server_task.await??;

    tracing::info!("Shutdown complete");
    Ok(())
}
