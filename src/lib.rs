//! Shortener - shortlink persistence and generation engine
//!
//! Shortens long URLs into random fixed-length codes, resolves codes back,
//! and keeps per-owner link sets with soft deletion.
//!
//! # Architecture
//! - `storage`: repository trait with in-memory and SeaORM backends, snapshots
//! - `services`: validation, code generation with retry, batch creation
//! - `batch`: buffered asynchronous soft deletes
//! - `config`: TOML + environment configuration
//! - `runtime`: startup/shutdown lifecycle and execution modes
//! - `system`: logging setup

pub mod batch;
pub mod cli;
pub mod config;
pub mod errors;
pub mod interfaces;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod system;
pub mod utils;
