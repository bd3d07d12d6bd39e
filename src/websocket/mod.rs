//! WebSocket client for a live room relay.
//!
//! This module provides the connection lifecycle controller with heartbeat,
//! bounded exponential reconnect and graceful shutdown, plus the wire
//! message model and the handler seam used for display.

pub mod client;
pub mod dispatch;
pub mod heartbeat;
pub mod messages;
pub mod reconnect;
pub mod stats;

pub use client::{ConnectionState, LiveClient, CLOSE_GRACE_PERIOD};
pub use dispatch::{dispatch_frame, MessageHandler};
pub use messages::{InboundMessage, OutboundKind, OutboundMessage, WsFrame};
pub use reconnect::ReconnectPolicy;
pub use stats::{SessionStats, StatsSnapshot};
