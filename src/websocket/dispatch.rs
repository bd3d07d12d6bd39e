//! Message handler seam between the controller and the display.

use tracing::warn;

use super::messages::InboundMessage;
use super::stats::SessionStats;
use crate::traits::WsError;

/// Receives routed server messages.
///
/// Called from the read loop, so implementations should not block.
pub trait MessageHandler: Send + Sync {
    fn on_message(&self, message: &InboundMessage);

    /// The session gave up reconnecting.
    fn on_terminated(&self, _error: &WsError) {}
}

impl<F> MessageHandler for F
where
    F: Fn(&InboundMessage) + Send + Sync,
{
    fn on_message(&self, message: &InboundMessage) {
        self(message)
    }
}

/// Decode one frame and hand it to `handler`.
///
/// Malformed frames are logged with their raw text and counted; they never
/// reach the handler.
pub fn dispatch_frame(
    text: &str,
    handler: &dyn MessageHandler,
    stats: &SessionStats,
) -> Result<(), WsError> {
    match InboundMessage::parse(text) {
        Ok(message) => {
            stats.record(&message);
            handler.on_message(&message);
            Ok(())
        }
        Err(e) => {
            stats.record_malformed();
            warn!(error = %e, raw = %text, "Skipping malformed message");
            Err(e)
        }
    }
}
