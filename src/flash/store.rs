//! Cookie-backed message store.
//!
//! # Responsibilities
//! - Attach one `Set-Cookie` token per pushed message
//! - Collect, order and decode pending tokens from a request
//! - Expire every consumed token, including ones that fail to decode
//!
//! # Design Decisions
//! - Best effort: encode and decode failures never reach the caller
//! - Both `push` and `pop_all` only touch headers, so they must run before
//!   the response head is sent

use std::collections::HashSet;
use std::time::Duration;

use axum::http::{
    header::{COOKIE, SET_COOKIE},
    HeaderMap, HeaderValue,
};
use cookie::{time::OffsetDateTime, Cookie};

use crate::flash::codec::{self, FlashError};
use crate::flash::Message;
use crate::observability::metrics;

/// Default token lifetime.
pub const DEFAULT_LIFETIME: Duration = Duration::from_secs(60 * 60);

/// Attributes applied to every token this store writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenOptions {
    /// Cookie `Path` attribute, shared by pushes and removals.
    pub path: String,
    /// How long an unread token stays on the client.
    pub lifetime: Duration,
}

impl Default for TokenOptions {
    fn default() -> Self {
        Self {
            path: "/".to_string(),
            lifetime: DEFAULT_LIFETIME,
        }
    }
}

/// Push a single flash message onto the response headers.
pub fn push(headers: &mut HeaderMap, category: &str, text: &str) {
    push_message(headers, &Message::new(category, text));
}

/// Push an existing message with the default token options.
pub fn push_message(headers: &mut HeaderMap, message: &Message) {
    push_with(headers, message, &TokenOptions::default());
}

/// Push a message with explicit token options.
///
/// A message that cannot be encoded is dropped with a warning.
pub fn push_with(headers: &mut HeaderMap, message: &Message, options: &TokenOptions) {
    match token_header(message, options) {
        Ok(value) => {
            headers.append(SET_COOKIE, value);
            metrics::record_pushed();
        }
        Err(e) => {
            tracing::warn!(category = %message.category, error = %e, "Dropping flash message");
        }
    }
}

/// Pop every pending message from the request and expire its token.
pub fn pop_all(response_headers: &mut HeaderMap, request_headers: &HeaderMap) -> Vec<Message> {
    pop_all_with(response_headers, request_headers, &TokenOptions::default())
}

/// Pop every pending message, writing removals with the given options.
///
/// Messages come back in push order. Every matching token is expired once,
/// whether or not it decodes. Tokens already expired on `response_headers`
/// are treated as consumed.
pub fn pop_all_with(
    response_headers: &mut HeaderMap,
    request_headers: &HeaderMap,
    options: &TokenOptions,
) -> Vec<Message> {
    let mut expired = expired_names(response_headers);
    let tokens: Vec<(String, String)> = pending_tokens(request_headers)
        .into_iter()
        .filter(|(name, _)| !expired.contains(name))
        .collect();

    for (name, _) in &tokens {
        if !expired.insert(name.clone()) {
            continue;
        }
        match HeaderValue::from_str(&removal_cookie(name, options).to_string()) {
            Ok(value) => {
                response_headers.append(SET_COOKIE, value);
            }
            Err(e) => {
                tracing::warn!(cookie = %name, error = %e, "Cannot expire flash cookie");
            }
        }
    }

    let messages = decode_tokens(&tokens);
    metrics::record_popped(messages.len());
    messages
}

/// Read pending messages without expiring them.
pub fn peek(request_headers: &HeaderMap) -> Vec<Message> {
    decode_tokens(&pending_tokens(request_headers))
}

/// Build the `Set-Cookie` value carrying one message.
pub fn token_header(message: &Message, options: &TokenOptions) -> Result<HeaderValue, FlashError> {
    let value = codec::encode(message)?;
    let name = codec::cookie_name(&codec::sequence_key());
    let lifetime = cookie::time::Duration::try_from(options.lifetime)
        .unwrap_or(cookie::time::Duration::HOUR);

    let cookie = Cookie::build((name, value))
        .http_only(true)
        .path(options.path.clone())
        .expires(OffsetDateTime::now_utc() + lifetime)
        .build();

    Ok(HeaderValue::from_str(&cookie.to_string())?)
}

/// Cookie that overwrites and immediately expires a token.
fn removal_cookie(name: &str, options: &TokenOptions) -> Cookie<'static> {
    Cookie::build((name.to_string(), String::new()))
        .http_only(true)
        .path(options.path.clone())
        .max_age(cookie::time::Duration::ZERO)
        .expires(OffsetDateTime::UNIX_EPOCH + cookie::time::Duration::SECOND)
        .build()
}

/// Flash cookies the response already overwrites with a removal.
fn expired_names(response_headers: &HeaderMap) -> HashSet<String> {
    response_headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| Cookie::parse(v).ok())
        .filter(|c| codec::is_flash_cookie(c.name()))
        .filter(|c| c.value().is_empty() && c.max_age() == Some(cookie::time::Duration::ZERO))
        .map(|c| c.name().to_string())
        .collect()
}

/// Flash tokens on the request, ordered by sequence key.
fn pending_tokens(request_headers: &HeaderMap) -> Vec<(String, String)> {
    let mut tokens: Vec<(String, String)> = request_headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .filter(|c| codec::is_flash_cookie(c.name()))
        .map(|c| (c.name().to_string(), c.value().to_string()))
        .collect();

    tokens.sort_by(|(a, _), (b, _)| codec::compare_names(a, b));
    tokens
}

fn decode_tokens(tokens: &[(String, String)]) -> Vec<Message> {
    let mut messages = Vec::with_capacity(tokens.len());
    for (name, value) in tokens {
        match codec::decode(value) {
            Ok(message) => messages.push(message),
            Err(e) => {
                tracing::debug!(cookie = %name, error = %e, "Skipping undecodable flash cookie");
                metrics::record_decode_failure();
            }
        }
    }
    messages
}
