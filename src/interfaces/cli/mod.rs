//! CLI command implementations
//!
//! Every command runs against a fully started engine and prints its result
//! to stdout; errors are returned to the caller.

mod config_gen;
mod links;

pub use config_gen::generate_config;
pub use links::{delete_links, list_links, ping, resolve_link, shorten, shorten_batch};
