//! Client configuration.
//!
//! Connect timeout and close grace period are fixed constants and are not
//! part of this type.

use std::time::Duration;

use tracing::warn;

use crate::adapters::validate_ws_url;
use crate::traits::WsError;
use crate::websocket::heartbeat::DEFAULT_HEARTBEAT_INTERVAL;
use crate::websocket::reconnect::{
    ReconnectPolicy, DEFAULT_BASE_DELAY, DEFAULT_MAX_RECONNECT_ATTEMPTS,
};

/// Default relay server.
pub const DEFAULT_SERVER_URL: &str = "ws://localhost:8000";

/// Environment variable overriding the relay server.
pub const ENV_SERVER_URL: &str = "TIKLIVE_SERVER_URL";
/// Environment variable overriding the heartbeat period, in seconds.
pub const ENV_HEARTBEAT_SECS: &str = "TIKLIVE_HEARTBEAT_SECS";

/// Configuration for one room session.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use tiklive::config::ClientConfig;
///
/// let config = ClientConfig::new("7514168917980400426")
///     .with_server_url("ws://127.0.0.1:9000")
///     .with_heartbeat_interval(Duration::from_secs(10));
/// assert_eq!(config.room_url(), "ws://127.0.0.1:9000/ws/7514168917980400426");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Relay server base URL (default: ws://localhost:8000)
    pub server_url: String,
    /// Numeric room identifier
    pub room_id: String,
    /// Time between heartbeat pings (default: 30s)
    pub heartbeat_interval: Duration,
    /// Reconnect attempts before giving up (default: 5)
    pub max_reconnect_attempts: u32,
    /// Delay before the first reconnect attempt (default: 1s)
    pub base_delay: Duration,
    /// Optional upper bound on a single backoff delay
    pub max_delay: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            room_id: String::new(),
            heartbeat_interval: DEFAULT_HEARTBEAT_INTERVAL,
            max_reconnect_attempts: DEFAULT_MAX_RECONNECT_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
            max_delay: None,
        }
    }
}

impl ClientConfig {
    /// Create a config for `room_id` with default values.
    pub fn new(room_id: impl Into<String>) -> Self {
        Self {
            room_id: room_id.into(),
            ..Self::default()
        }
    }

    /// Create a config for `room_id`, applying environment overrides.
    pub fn from_env(room_id: impl Into<String>) -> Self {
        let mut config = Self::new(room_id);

        if let Ok(url) = std::env::var(ENV_SERVER_URL) {
            if !url.trim().is_empty() {
                config.server_url = url.trim().to_string();
            }
        }

        if let Ok(raw) = std::env::var(ENV_HEARTBEAT_SECS) {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => config.heartbeat_interval = Duration::from_secs(secs),
                _ => warn!(value = %raw, "Ignoring invalid {}", ENV_HEARTBEAT_SECS),
            }
        }

        config
    }

    pub fn with_server_url(mut self, url: impl Into<String>) -> Self {
        self.server_url = url.into();
        self
    }

    pub fn with_heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = interval;
        self
    }

    pub fn with_max_reconnect_attempts(mut self, attempts: u32) -> Self {
        self.max_reconnect_attempts = attempts;
        self
    }

    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = Some(delay);
        self
    }

    /// Full websocket URL for the room: `<server_url>/ws/<room_id>`.
    pub fn room_url(&self) -> String {
        format!("{}/ws/{}", self.server_url.trim_end_matches('/'), self.room_id)
    }

    /// Check that the room URL is a usable websocket URL.
    pub fn validate(&self) -> Result<(), WsError> {
        if self.room_id.is_empty() {
            return Err(WsError::InvalidUrl("room id is empty".to_string()));
        }
        validate_ws_url(&self.room_url()).map(|_| ())
    }

    pub fn reconnect_policy(&self) -> ReconnectPolicy {
        let policy = ReconnectPolicy::new(self.base_delay, self.max_reconnect_attempts);
        match self.max_delay {
            Some(cap) => policy.with_max_delay(cap),
            None => policy,
        }
    }
}
