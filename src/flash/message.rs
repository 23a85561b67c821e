//! Flash message value type.

use serde::{Deserialize, Serialize};

/// A single one-time notice.
///
/// Field names are shortened on the wire to keep the cookie small.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Severity or class tag (e.g. "info", "error").
    #[serde(rename = "c")]
    pub category: String,

    /// Notice content.
    #[serde(rename = "t")]
    pub text: String,
}

impl Message {
    /// Create a new message.
    pub fn new(category: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            text: text.into(),
        }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self::new("info", text)
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self::new("success", text)
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self::new("warning", text)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new("error", text)
    }
}
