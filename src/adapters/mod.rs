//! Concrete implementations of trait abstractions.
//!
//! # Adapters
//!
//! - [`TungsteniteConnector`] - WebSocket using tokio-tungstenite
//!
//! # Mock Implementations
//!
//! The [`mock`] submodule provides test doubles:
//! - [`mock::MockConnector`] - Scripted connect outcomes
//! - [`mock::MockTransport`] - Frame injection for testing

pub mod mock;
pub mod tungstenite_ws;

pub use mock::{MockConnector, MockTransport};
pub use tungstenite_ws::{validate_ws_url, TungsteniteConnector, TungsteniteTransport, CONNECT_TIMEOUT};
