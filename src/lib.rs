//! Flash messages for Axum applications.
//!
//! Handlers push short one-time notices into cookies; on the next HTML
//! response the [`FlashLayer`] pops them and renders them into the page.
//!
//! ```text
//!     POST /form ─▶ handler ─▶ Flash + Redirect ─▶ Set-Cookie: flash_…
//!
//!     GET /      ─▶ FlashService ─▶ handler
//!                        │
//!                        ▼
//!                  HTML response? ── no ──▶ forwarded untouched
//!                        │ yes
//!                        ▼
//!                  pop_all (expire cookies) ─▶ render ─▶ FlashBody
//!                                                 replaces <flashmessages>
//!                                                 or inserts before </body>
//! ```

pub mod config;
pub mod flash;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod render;

pub use config::AppConfig;
pub use flash::{pop_all, push, Flash, FlashMessages, Message};
pub use http::{FlashLayer, FlashService};
pub use lifecycle::Shutdown;
pub use render::{Render, RendererHandle, TemplateRenderer};
