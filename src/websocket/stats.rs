//! Per-session message counters.

use std::sync::atomic::{AtomicU64, Ordering};

use super::messages::InboundMessage;

/// Lock-free counters updated by the read loop and heartbeat.
#[derive(Debug, Default)]
pub struct SessionStats {
    status: AtomicU64,
    pong: AtomicU64,
    activity: AtomicU64,
    gift: AtomicU64,
    error: AtomicU64,
    other: AtomicU64,
    malformed: AtomicU64,
    pings_sent: AtomicU64,
}

/// Point-in-time copy of [`SessionStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub status_messages: u64,
    pub pong_messages: u64,
    pub activity_messages: u64,
    pub gift_messages: u64,
    pub error_messages: u64,
    pub other_messages: u64,
    pub malformed_messages: u64,
    pub pings_sent: u64,
}

impl StatsSnapshot {
    /// Messages that decoded successfully.
    pub fn total_messages(&self) -> u64 {
        self.status_messages
            + self.pong_messages
            + self.activity_messages
            + self.gift_messages
            + self.error_messages
            + self.other_messages
    }
}

impl SessionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, message: &InboundMessage) {
        let counter = match message {
            InboundMessage::Status { .. } | InboundMessage::Connected { .. } => &self.status,
            InboundMessage::Pong { .. } => &self.pong,
            InboundMessage::ServerActivity { .. } => &self.activity,
            InboundMessage::Gift { .. } => &self.gift,
            InboundMessage::ErrorReport { .. } => &self.error,
            InboundMessage::Unrecognized { .. } => &self.other,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_malformed(&self) {
        self.malformed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_ping(&self) {
        self.pings_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            status_messages: self.status.load(Ordering::Relaxed),
            pong_messages: self.pong.load(Ordering::Relaxed),
            activity_messages: self.activity.load(Ordering::Relaxed),
            gift_messages: self.gift.load(Ordering::Relaxed),
            error_messages: self.error.load(Ordering::Relaxed),
            other_messages: self.other.load(Ordering::Relaxed),
            malformed_messages: self.malformed.load(Ordering::Relaxed),
            pings_sent: self.pings_sent.load(Ordering::Relaxed),
        }
    }
}
