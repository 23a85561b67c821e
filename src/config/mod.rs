//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!
//! When flash.watch_template is set:
//!     watcher.rs detects a template change
//!     → template recompiled
//!     → atomic swap of the shared renderer
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; only the template is reloadable
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, ConfigError};
pub use schema::{AppConfig, FlashConfig, ListenerConfig, ObservabilityConfig, TimeoutConfig};
pub use watcher::TemplateWatcher;
