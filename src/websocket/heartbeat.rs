//! Periodic application-level ping.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::messages::OutboundMessage;
use super::stats::SessionStats;
use crate::traits::Transport;

/// Default time between pings.
pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// Spawn the heartbeat for one connection.
///
/// The first ping goes out one full `period` after spawning. The task exits
/// as soon as `token` is cancelled; a failed send is logged and the next
/// tick tries again.
pub fn spawn_heartbeat(
    transport: Arc<dyn Transport>,
    period: Duration,
    token: CancellationToken,
    stats: Arc<SessionStats>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let payload = match OutboundMessage::ping_now().to_json() {
                Ok(payload) => payload,
                Err(e) => {
                    warn!(error = %e, "Failed to serialize ping");
                    continue;
                }
            };

            let sent = tokio::select! {
                biased;
                _ = token.cancelled() => break,
                sent = transport.send(payload) => sent,
            };

            match sent {
                Ok(()) => {
                    stats.record_ping();
                    debug!("Heartbeat ping sent");
                }
                Err(e) => warn!(error = %e, code = e.error_code(), "Failed to send heartbeat"),
            }
        }

        debug!("Heartbeat stopped");
    })
}
