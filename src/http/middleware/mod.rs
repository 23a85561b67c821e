//! HTTP middleware.

pub mod embed;

pub use embed::{FlashLayer, FlashService};
