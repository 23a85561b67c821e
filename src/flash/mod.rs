//! Flash message store.
//!
//! # Data Flow
//! ```text
//! handler
//!     → push() / Flash (one Set-Cookie per message)
//!     → redirect
//! next request
//!     → pop_all() (decode, order, expire)
//!     → Vec<Message> handed to the renderer
//! ```
//!
//! # Design Decisions
//! - State lives only in client cookies; nothing is kept server side
//! - Push order is recovered from the cookie name's sequence key
//! - Undecodable tokens are expired and skipped, never reported

pub mod codec;
pub mod extract;
pub mod message;
pub mod store;

pub use codec::FlashError;
pub use extract::{Flash, FlashMessages};
pub use message::Message;
pub use store::{peek, pop_all, pop_all_with, push, push_message, push_with, TokenOptions};
