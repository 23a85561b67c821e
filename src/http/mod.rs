//! HTTP subsystem.
//!
//! # Data Flow
//! ```text
//! request
//!     → middleware/embed.rs (FlashService remembers request cookies)
//!     → inner handler
//!     → response head: sniff.rs classifies HTML vs. everything else
//!     → body.rs (FlashBody rewrites frames as they stream)
//!     → client
//! ```

pub mod body;
pub mod middleware;
pub mod server;
pub mod sniff;

pub use body::{FlashBody, Markers};
pub use middleware::{FlashLayer, FlashService};
pub use server::DemoServer;
