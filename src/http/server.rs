//! Demo HTTP server.
//!
//! # Responsibilities
//! - Serve a form that pushes one flash message per submitted line
//! - Redirect after POST so the messages show up on the next page
//! - Wire up middleware (flash embedding, timeout, tracing)
//! - Shut down gracefully on signal

use std::time::Duration;

use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect},
    routing::get,
    Form, Json, Router,
};
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::AppConfig;
use crate::flash::{Flash, FlashMessages, Message, TokenOptions};
use crate::http::middleware::FlashLayer;

/// Page served by `GET /`. The tag is replaced by the flash middleware.
pub const DEMO_PAGE: &str = r#"<!doctype html>
<html>
<style>
label { display: block; }
.flash-messages { position: absolute; top: 2em; right: 2em; }
.alert { margin: 1em; background: #FFF6D1; padding: 1.4em; min-width: 10em; border-radius: 5px; font-size: 1.4em; }
.alert-info { background: #BCEFFF; }
.alert-error { background: #F7C5B7; }
</style>
<body>

<flashmessages>

<form action="/" method="POST">
	<label>
		Category:
		<input type="text" name="category" value="info" required>
	</label>
	<label>
		Content. Messages are split by the newline character:
		<textarea name="text"></textarea>
	</label>
	<button>Submit</button>
</form>
</body>
</html>
"#;

/// Form submitted to `POST /`.
#[derive(Debug, Deserialize)]
pub struct PushForm {
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub text: String,
}

fn default_category() -> String {
    "info".to_string()
}

/// HTTP server for the flash demo.
pub struct DemoServer {
    router: Router,
}

impl DemoServer {
    /// Create a server whose flash layer is built from configuration.
    pub fn new(config: &AppConfig, flash: FlashLayer) -> Self {
        Self {
            router: Self::build_router(config, flash),
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &AppConfig, flash: FlashLayer) -> Router {
        let cookies = flash.options().clone();
        Router::new()
            .route("/", get(index).post(submit))
            .route("/messages.json", get(pending_messages))
            .with_state(cookies)
            .layer(flash)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(TraceLayer::new_for_http())
    }

    /// The configured router, for driving the server without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until the shutdown channel fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn index() -> Html<&'static str> {
    Html(DEMO_PAGE)
}

async fn submit(
    State(cookies): State<TokenOptions>,
    Form(form): Form<PushForm>,
) -> impl IntoResponse {
    let flash = split_lines(&form.text).fold(Flash::with_options(cookies), |flash, line| {
        flash.push(form.category.as_str(), line)
    });

    tracing::debug!(count = flash.len(), category = %form.category, "Pushed flash messages");
    (flash, Redirect::to("/"))
}

async fn pending_messages(FlashMessages(messages): FlashMessages) -> Json<Vec<Message>> {
    Json(messages)
}

/// Non-empty trimmed lines of a submitted text.
fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split('\n').map(str::trim).filter(|line| !line.is_empty())
}
