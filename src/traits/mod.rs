//! Trait abstractions for dependency injection and testability.
//!
//! # Traits
//!
//! - [`Connector`] - Opens websocket connections
//! - [`Transport`] - A single live websocket connection

pub mod websocket;

pub use websocket::{Connector, Transport, WsError};
