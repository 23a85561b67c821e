//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML files.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::flash::store::DEFAULT_LIFETIME;
use crate::http::body::{FALLBACK_MARKER, PLACEHOLDER_MARKER};
use crate::observability::logging::DEFAULT_FILTER;

/// Root configuration for the demo server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Flash message middleware settings.
    pub flash: FlashConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".to_string(),
        }
    }
}

/// Flash middleware configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FlashConfig {
    /// Tera template used to render messages. The built-in template is used
    /// when unset.
    pub template_path: Option<PathBuf>,

    /// Reload the template when the file changes.
    pub watch_template: bool,

    /// Tag replaced by the rendered messages.
    pub placeholder_marker: String,

    /// Tag the messages are inserted before when no placeholder exists.
    pub fallback_marker: String,

    /// `Path` attribute of flash cookies.
    pub cookie_path: String,

    /// Lifetime of an unread flash cookie, in seconds.
    pub cookie_lifetime_secs: u64,
}

impl Default for FlashConfig {
    fn default() -> Self {
        Self {
            template_path: None,
            watch_template: false,
            placeholder_marker: PLACEHOLDER_MARKER.to_string(),
            fallback_marker: FALLBACK_MARKER.to_string(),
            cookie_path: "/".to_string(),
            cookie_lifetime_secs: DEFAULT_LIFETIME.as_secs(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log filter directive (e.g. "info", "flash_embed=debug").
    pub log_level: String,

    /// Log output format: "pretty" or "json".
    pub log_format: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_FILTER.to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_fills_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [flash]
            cookie_lifetime_secs = 120
            template_path = "templates/flash.html"
            "#,
        )
        .unwrap();

        assert_eq!(config.flash.cookie_lifetime_secs, 120);
        assert_eq!(config.flash.template_path, Some(PathBuf::from("templates/flash.html")));
        assert_eq!(config.flash.placeholder_marker, "<flashmessages>");
        assert_eq!(config.flash.fallback_marker, "</body>");
        assert_eq!(config.listener.bind_address, "0.0.0.0:8000");
        assert_eq!(config.flash.cookie_path, "/");
    }
}
