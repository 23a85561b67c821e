//! Flash embedding middleware.
//!
//! Wraps an inner service and, for HTML responses, pops the request's
//! pending flash messages and renders them into the response body.
//!
//! If the body contains `<flashmessages>`, that tag is replaced with the
//! messages (or removed when there are none). Otherwise the messages are
//! inserted before `</body>`. Markers are searched per body frame, so
//! handlers must emit each tag within a single frame.

use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use axum::http::{
    header::{CONTENT_LENGTH, CONTENT_TYPE},
    HeaderMap, Request, Response,
};
use bytes::Bytes;
use futures_util::future::BoxFuture;
use http_body::{Body, Frame};
use http_body_util::BodyExt;
use tower::{Layer, Service};

use crate::config::FlashConfig;
use crate::flash::{self, TokenOptions};
use crate::http::body::{FlashBody, Markers, Rewriter};
use crate::http::sniff;
use crate::observability::metrics;
use crate::render::{Render, RenderError, RendererHandle, TemplateRenderer};

/// Tower layer that embeds flash messages into HTML responses.
#[derive(Clone, Debug)]
pub struct FlashLayer {
    renderer: RendererHandle,
    markers: Arc<Markers>,
    options: TokenOptions,
}

impl FlashLayer {
    /// Layer using the built-in template.
    pub fn new() -> Self {
        Self::with_handle(RendererHandle::default())
    }

    /// Layer using a custom renderer.
    pub fn with_renderer(renderer: impl Render) -> Self {
        Self::with_handle(RendererHandle::new(renderer))
    }

    /// Layer sharing a renderer that may be replaced at runtime.
    pub fn with_handle(renderer: RendererHandle) -> Self {
        Self {
            renderer,
            markers: Arc::new(Markers::default()),
            options: TokenOptions::default(),
        }
    }

    /// Build a layer from configuration, loading the template file if one is
    /// set.
    pub fn from_config(config: &FlashConfig) -> Result<Self, RenderError> {
        let renderer = match &config.template_path {
            Some(path) => TemplateRenderer::from_file(path)?,
            None => TemplateRenderer::default(),
        };
        Ok(Self::with_handle(RendererHandle::new(renderer)).configure(config))
    }

    /// Apply markers and token options from configuration.
    pub fn configure(self, config: &FlashConfig) -> Self {
        self.markers(Markers {
            placeholder: config.placeholder_marker.clone(),
            fallback: config.fallback_marker.clone(),
        })
        .token_options(TokenOptions {
            path: config.cookie_path.clone(),
            lifetime: Duration::from_secs(config.cookie_lifetime_secs),
        })
    }

    pub fn markers(mut self, markers: Markers) -> Self {
        self.markers = Arc::new(markers);
        self
    }

    pub fn token_options(mut self, options: TokenOptions) -> Self {
        self.options = options;
        self
    }

    /// Cookie attributes used for removals; handlers pushing messages
    /// should use the same path.
    pub fn options(&self) -> &TokenOptions {
        &self.options
    }

    /// Handle to the renderer, for hot reload.
    pub fn renderer(&self) -> &RendererHandle {
        &self.renderer
    }
}

impl Default for FlashLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Layer<S> for FlashLayer {
    type Service = FlashService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        FlashService {
            inner,
            renderer: self.renderer.clone(),
            markers: self.markers.clone(),
            options: self.options.clone(),
        }
    }
}

/// Service produced by [`FlashLayer`].
#[derive(Clone, Debug)]
pub struct FlashService<S> {
    inner: S,
    renderer: RendererHandle,
    markers: Arc<Markers>,
    options: TokenOptions,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for FlashService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + 'static,
    S::Future: Send + 'static,
    ReqBody: 'static,
    ResBody: Body<Data = Bytes> + Send + 'static,
    ResBody::Error: Send,
{
    type Response = Response<FlashBody<ResBody>>;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<ReqBody>) -> Self::Future {
        // Cookies are read after the inner service has consumed the request.
        let request_headers = request.headers().clone();
        let future = self.inner.call(request);

        let renderer = self.renderer.clone();
        let markers = self.markers.clone();
        let options = self.options.clone();

        Box::pin(async move {
            let response = future.await?;
            Ok(embed(response, request_headers, renderer, markers, options).await)
        })
    }
}

/// Classify the response once and wrap its body.
async fn embed<B>(
    response: Response<B>,
    request_headers: HeaderMap,
    renderer: RendererHandle,
    markers: Arc<Markers>,
    options: TokenOptions,
) -> Response<FlashBody<B>>
where
    B: Body<Data = Bytes> + Send + 'static,
{
    let (mut parts, body) = response.into_parts();
    let mut body = Box::pin(body);
    let mut buffered = None;

    let declared = parts
        .headers
        .get(CONTENT_TYPE)
        .filter(|v| !v.is_empty())
        .map(|v| v.to_str().map(sniff::is_html).unwrap_or(false));

    let html = match declared {
        // Nothing will be written, so there is nothing to render into.
        Some(html) => html && !body.is_end_stream(),
        None => {
            buffered = first_data_frame(&mut body).await;
            match &buffered {
                Some(Ok(frame)) => frame
                    .data_ref()
                    .map(|data| sniff::is_html(sniff::detect_content_type(data)))
                    .unwrap_or(false),
                _ => false,
            }
        }
    };

    if !html {
        tracing::trace!(sniffed = declared.is_none(), "Passing through non-HTML response");
        metrics::record_response("passthrough");
        return Response::from_parts(parts, FlashBody::passthrough(body, buffered));
    }

    let messages = flash::pop_all_with(&mut parts.headers, &request_headers, &options);
    parts.headers.remove(CONTENT_LENGTH);

    tracing::debug!(
        pending = messages.len(),
        sniffed = declared.is_none(),
        "Embedding flash messages"
    );
    metrics::record_response("html");

    let rewriter = Rewriter::new(messages, renderer.current(), markers);
    Response::from_parts(parts, FlashBody::rewriting(body, buffered, rewriter))
}

/// Pull the first non-empty data frame, or whatever ends the stream early.
async fn first_data_frame<B>(
    body: &mut std::pin::Pin<Box<B>>,
) -> Option<Result<Frame<Bytes>, B::Error>>
where
    B: Body<Data = Bytes>,
{
    loop {
        match body.frame().await {
            Some(Ok(frame)) if frame.data_ref().is_some_and(|d| d.is_empty()) => continue,
            other => return other,
        }
    }
}
