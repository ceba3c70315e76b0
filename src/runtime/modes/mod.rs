//! Mode routing
//!
//! `serve` keeps the engine running until Ctrl+C; every other subcommand
//! starts the engine, runs once and shuts down again.

pub mod cli;
pub mod server;

pub use cli::run_cli;
pub use server::run_server;
