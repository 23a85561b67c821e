//! Axum integration for handlers that push or read flash messages.

use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponseParts, ResponseParts},
};
use serde::Serialize;

use crate::flash::store::{self, TokenOptions};
use crate::flash::Message;

/// Pending messages on the incoming request, read without consuming them.
///
/// Rendering the messages is left to [`crate::FlashLayer`], which expires the
/// tokens once an HTML page shows them.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FlashMessages(pub Vec<Message>);

impl FlashMessages {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.0.iter()
    }
}

impl<S> FromRequestParts<S> for FlashMessages
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(store::peek(&parts.headers)))
    }
}

/// Messages to push onto the outgoing response.
///
/// ```ignore
/// async fn save() -> (Flash, Redirect) {
///     (Flash::new().success("Saved"), Redirect::to("/"))
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct Flash {
    messages: Vec<Message>,
    options: TokenOptions,
}

impl Flash {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use explicit token options instead of the defaults.
    pub fn with_options(options: TokenOptions) -> Self {
        Self {
            messages: Vec::new(),
            options,
        }
    }

    pub fn push(mut self, category: impl Into<String>, text: impl Into<String>) -> Self {
        self.messages.push(Message::new(category, text));
        self
    }

    pub fn info(self, text: impl Into<String>) -> Self {
        self.push("info", text)
    }

    pub fn success(self, text: impl Into<String>) -> Self {
        self.push("success", text)
    }

    pub fn warning(self, text: impl Into<String>) -> Self {
        self.push("warning", text)
    }

    pub fn error(self, text: impl Into<String>) -> Self {
        self.push("error", text)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl IntoResponseParts for Flash {
    type Error = Infallible;

    fn into_response_parts(self, mut res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        for message in &self.messages {
            store::push_with(res.headers_mut(), message, &self.options);
        }
        Ok(res)
    }
}
