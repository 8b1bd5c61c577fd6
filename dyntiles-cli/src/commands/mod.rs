//! CLI command implementations.
//!
//! # Command Modules
//!
//! - [`cgi`] - Request entry points (`document`, `tile`)
//! - [`bounds`] - Tile geometry diagnostics
//! - [`config`] - Configuration management (path, init, show)

pub mod bounds;
pub mod cgi;
pub mod config;
