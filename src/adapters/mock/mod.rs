//! Mock implementations for testing.
//!
//! This module provides mock implementations of the transport traits,
//! enabling controller tests without a network.
//!
//! # Available Mocks
//!
//! - [`MockConnector`] - Scripted connect outcomes
//! - [`MockTransport`] - Frame injection and outbound capture

pub mod websocket;

pub use websocket::{MockConnector, MockTransport};
