//! tiklive - a live room websocket client
//!
//! This library exposes modules for use by the binary and integration tests.

pub mod adapters;
pub mod cli;
pub mod cli_output;
pub mod config;
pub mod display;
pub mod traits;
pub mod websocket;
