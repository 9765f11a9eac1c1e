//! idsync CLI library
//!
//! The binary in `main.rs` parses arguments and dispatches to [`commands`];
//! [`api`] implements the core remote traits over HTTP.

pub mod api;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
