//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! flash store, middleware, demo server produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters for pushes, pops, insertions)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Prometheus scrape endpoint
//! ```
//!
//! # Design Decisions
//! - Structured fields, never preformatted strings
//! - Metric updates are cheap and safe to call without a recorder installed

pub mod logging;
pub mod metrics;
