//! Cookie naming and payload encoding for flash tokens.
//!
//! # Wire format
//! ```text
//! name  = "flash_" <sequence key, 20 zero-padded decimal digits>
//! value = base64(standard alphabet) of {"c": category, "t": text}
//! ```

use std::cmp::Ordering as CmpOrdering;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use axum::http::header::InvalidHeaderValue;
use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::flash::Message;

/// Namespace prefix shared by every cookie this store owns.
pub const COOKIE_PREFIX: &str = "flash_";

/// Width of the zero-padded sequence key.
const SEQUENCE_KEY_WIDTH: usize = 20;

/// Last issued sequence key. Keeps keys strictly increasing within a process
/// even when the clock does not advance between two pushes.
static LAST_SEQUENCE_KEY: AtomicU64 = AtomicU64::new(0);

/// Errors from encoding or decoding a flash token.
#[derive(Debug, thiserror::Error)]
pub enum FlashError {
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("invalid message payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid header value: {0}")]
    Header(#[from] InvalidHeaderValue),
}

/// Encode a message into a cookie-safe value.
pub fn encode(message: &Message) -> Result<String, FlashError> {
    let raw = serde_json::to_vec(message)?;
    Ok(STANDARD.encode(raw))
}

/// Decode a cookie value back into a message.
pub fn decode(value: &str) -> Result<Message, FlashError> {
    let raw = STANDARD.decode(value)?;
    Ok(serde_json::from_slice(&raw)?)
}

/// Issue the next sequence key: nanoseconds since the epoch, zero-padded.
pub fn sequence_key() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64;

    let mut prev = LAST_SEQUENCE_KEY.load(Ordering::Relaxed);
    let next = loop {
        let candidate = now.max(prev + 1);
        match LAST_SEQUENCE_KEY.compare_exchange_weak(
            prev, candidate, Ordering::Relaxed, Ordering::Relaxed
        ) {
            Ok(_) => break candidate,
            Err(x) => prev = x,
        }
    };

    format!("{:0width$}", next, width = SEQUENCE_KEY_WIDTH)
}

/// Build a cookie name from a sequence key.
pub fn cookie_name(key: &str) -> String {
    format!("{}{}", COOKIE_PREFIX, key)
}

/// Return true if the cookie belongs to the flash store.
pub fn is_flash_cookie(name: &str) -> bool {
    name.starts_with(COOKIE_PREFIX)
}

/// Order two flash cookie names by their sequence keys.
///
/// All-digit keys compare numerically regardless of width; any other key
/// sorts after the numeric ones, in plain string order.
pub fn compare_names(a: &str, b: &str) -> CmpOrdering {
    let a = a.strip_prefix(COOKIE_PREFIX).unwrap_or(a);
    let b = b.strip_prefix(COOKIE_PREFIX).unwrap_or(b);

    match (numeric_key(a), numeric_key(b)) {
        (Some(x), Some(y)) => x.len().cmp(&y.len()).then_with(|| x.cmp(y)),
        (Some(_), None) => CmpOrdering::Less,
        (None, Some(_)) => CmpOrdering::Greater,
        (None, None) => a.cmp(b),
    }
}

/// Significant digits of an all-digit key.
fn numeric_key(key: &str) -> Option<&str> {
    if key.is_empty() || !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(key.trim_start_matches('0'))
}
