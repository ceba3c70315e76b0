//! Service layer
//!
//! Business logic shared by the command-line driver and any outer
//! surface that embeds the crate.

mod shortener;

pub use shortener::{BatchLinkRequest, MAX_GENERATION_ATTEMPTS, ShortenerService};
