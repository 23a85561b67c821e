//! Rendering pending messages into markup.
//!
//! The middleware never fails a response because of rendering: errors are
//! logged and the messages are replaced by nothing.

use std::path::Path;
use std::sync::Arc;

use arc_swap::ArcSwap;
use bytes::Bytes;
use serde::Serialize;
use tera::{Context, Tera};

use crate::flash::Message;
use crate::observability::metrics;

/// Name under which the flash template is registered. The `.html` suffix
/// turns on Tera's autoescaping.
const TEMPLATE_NAME: &str = "flash.html";

/// Built-in markup: one alert per message inside a container.
pub const DEFAULT_TEMPLATE: &str = r#"
<div class="flash-messages">
	{%- for m in messages -%}
		<div class="alert alert-{{ m.category }}">{{ m.text }}</div>
	{%- endfor -%}
</div>
"#;

/// Errors raised while rendering or loading a template.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("template error: {0}")]
    Template(#[from] tera::Error),

    #[error("cannot read template: {0}")]
    Io(#[from] std::io::Error),
}

/// Turns an ordered list of messages into markup.
pub trait Render: Send + Sync + 'static {
    fn render(&self, messages: &[Message]) -> Result<Bytes, RenderError>;
}

/// Render, substituting empty output on failure.
pub fn render_or_empty(renderer: &dyn Render, messages: &[Message]) -> Bytes {
    match renderer.render(messages) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(error = %e, count = messages.len(), "Failed to render flash messages");
            metrics::record_render_failure();
            Bytes::new()
        }
    }
}

#[derive(Serialize)]
struct MessageView<'a> {
    category: &'a str,
    text: &'a str,
}

/// Tera-backed renderer. Templates see a `messages` list of
/// `{category, text}` objects.
#[derive(Debug, Clone)]
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Compile a renderer from template source.
    pub fn from_source(source: &str) -> Result<Self, RenderError> {
        let mut tera = Tera::default();
        tera.add_raw_template(TEMPLATE_NAME, source)?;
        Ok(Self { tera })
    }

    /// Compile a renderer from a template file.
    pub fn from_file(path: &Path) -> Result<Self, RenderError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_source(&source)
    }
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        let mut tera = Tera::default();
        tera.add_raw_template(TEMPLATE_NAME, DEFAULT_TEMPLATE)
            .expect("built-in flash template must compile");
        Self { tera }
    }
}

impl Render for TemplateRenderer {
    fn render(&self, messages: &[Message]) -> Result<Bytes, RenderError> {
        let views: Vec<MessageView<'_>> = messages
            .iter()
            .map(|m| MessageView {
                category: &m.category,
                text: &m.text,
            })
            .collect();

        let mut context = Context::new();
        context.insert("messages", &views);
        Ok(Bytes::from(self.tera.render(TEMPLATE_NAME, &context)?))
    }
}

/// Adapts a plain function into a [`Render`].
pub struct FnRenderer<F>(pub F);

impl<F> Render for FnRenderer<F>
where
    F: Fn(&[Message]) -> Bytes + Send + Sync + 'static,
{
    fn render(&self, messages: &[Message]) -> Result<Bytes, RenderError> {
        Ok((self.0)(messages))
    }
}

/// Shared renderer that can be swapped while the server runs.
///
/// Each response takes one snapshot, so a reload never changes the markup of
/// a response already in flight.
#[derive(Clone)]
pub struct RendererHandle {
    inner: Arc<ArcSwap<Box<dyn Render>>>,
}

impl RendererHandle {
    pub fn new(renderer: impl Render) -> Self {
        let renderer: Box<dyn Render> = Box::new(renderer);
        Self {
            inner: Arc::new(ArcSwap::from_pointee(renderer)),
        }
    }

    /// Snapshot of the current renderer.
    pub fn current(&self) -> Arc<Box<dyn Render>> {
        self.inner.load_full()
    }

    /// Replace the renderer for subsequent responses.
    pub fn replace(&self, renderer: impl Render) {
        let renderer: Box<dyn Render> = Box::new(renderer);
        self.inner.store(Arc::new(renderer));
    }
}

impl Default for RendererHandle {
    fn default() -> Self {
        Self::new(TemplateRenderer::default())
    }
}

impl std::fmt::Debug for RendererHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RendererHandle").finish_non_exhaustive()
    }
}
