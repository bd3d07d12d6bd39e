//! WebSocket transport trait abstraction.
//!
//! Provides a trait-based abstraction over a single websocket connection,
//! enabling dependency injection and mocking in tests. The controller in
//! [`crate::websocket::client`] only ever talks to these traits.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

/// WebSocket transport errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WsError {
    /// The endpoint could not be reached or the handshake failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    /// The handshake did not complete within the connect timeout
    #[error("Connection timeout: {0}")]
    Timeout(String),
    /// The endpoint URL is not a valid websocket URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    /// Reading a frame failed (abnormal closure or protocol violation)
    #[error("Receive failed: {0}")]
    ReceiveFailed(String),
    /// The peer closed the connection
    #[error("Connection closed: {0}")]
    Closed(String),
    /// Writing a frame failed
    #[error("Send failed: {0}")]
    SendFailed(String),
    /// There is no live connection to write to
    #[error("Not connected")]
    NotConnected,
    /// A frame could not be decoded as a server message
    #[error("Malformed message: {0}")]
    Malformed(String),
    /// The session was shut down while the operation was in flight
    #[error("Operation cancelled")]
    Cancelled,
    /// Reconnect attempts are exhausted
    #[error("Gave up after {0} reconnect attempts")]
    ReconnectExhausted(u32),
}

impl WsError {
    /// Whether this error ends a connection and should go through the
    /// reconnect policy.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            WsError::ConnectionFailed(_)
                | WsError::Timeout(_)
                | WsError::ReceiveFailed(_)
                | WsError::Closed(_)
        )
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            WsError::ConnectionFailed(_) => "E_WS_CONN",
            WsError::Timeout(_) => "E_WS_TIMEOUT",
            WsError::InvalidUrl(_) => "E_WS_URL",
            WsError::ReceiveFailed(_) => "E_WS_RECV",
            WsError::Closed(_) => "E_WS_CLOSED",
            WsError::SendFailed(_) => "E_WS_SEND",
            WsError::NotConnected => "E_WS_NOT_CONNECTED",
            WsError::Malformed(_) => "E_WS_MALFORMED",
            WsError::Cancelled => "E_WS_CANCELLED",
            WsError::ReconnectExhausted(_) => "E_WS_EXHAUSTED",
        }
    }
}

/// A single live websocket connection.
///
/// Implementations must serialize concurrent writes: the heartbeat task and
/// the command surface both call [`Transport::send`] while the read loop is
/// parked in [`Transport::receive`].
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one text frame.
    ///
    /// # Returns
    /// `Err(WsError::NotConnected)` once the connection has been closed
    async fn send(&self, text: String) -> Result<(), WsError>;

    /// Wait for the next text frame.
    ///
    /// Control frames are handled internally and never returned.
    async fn receive(&self) -> Result<String, WsError>;

    /// Send a close frame best-effort and release the socket.
    ///
    /// Calling this more than once is a no-op.
    async fn close(&self);
}

/// Factory for [`Transport`] connections.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Open a connection to `url`.
    async fn connect(&self, url: &str) -> Result<Arc<dyn Transport>, WsError>;
}
