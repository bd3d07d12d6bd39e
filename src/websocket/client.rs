use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::BoxFuture;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::dispatch::{dispatch_frame, MessageHandler};
use super::heartbeat::spawn_heartbeat;
use super::messages::OutboundMessage;
use super::reconnect::ReconnectPolicy;
use super::stats::{SessionStats, StatsSnapshot};
use crate::config::ClientConfig;
use crate::traits::{Connector, Transport, WsError};

/// Time allowed for the close request to flush before the socket is released.
pub const CLOSE_GRACE_PERIOD: Duration = Duration::from_secs(1);

/// Connection lifecycle state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Reconnecting { attempt: u32 },
    Closing,
    /// Reconnect attempts are exhausted; no further recovery
    Terminated,
}

/// Mutable session fields, only touched under the session lock.
#[derive(Default)]
struct Session {
    transport: Option<Arc<dyn Transport>>,
    /// Child of the shutdown token, cancelled when this connection ends
    connection_token: Option<CancellationToken>,
    heartbeat: Option<JoinHandle<()>>,
    /// Bumped on every successful connect so a stale read loop can tell it
    /// no longer owns the session
    generation: u64,
    reconnect_attempts: u32,
    connected_at: Option<Instant>,
}

impl Session {
    /// Detach the live connection, cancelling its heartbeat and read loop.
    fn detach(&mut self) -> Option<Arc<dyn Transport>> {
        if let Some(token) = self.connection_token.take() {
            token.cancel();
        }
        self.connected_at = None;
        self.transport.take()
    }
}

/// Live-room websocket client.
///
/// Owns one session: the connection, its heartbeat and read loop, and the
/// reconnect counter. All background tasks are parented to a single
/// shutdown token; [`LiveClient::close`] cancels it.
///
/// # Example
///
/// ```ignore
/// let client = LiveClient::new(
///     ClientConfig::new("7514168917980400426"),
///     Arc::new(TungsteniteConnector::new()),
///     Arc::new(ConsoleDisplay::new()),
/// );
/// client.connect().await?;
/// // ...
/// client.close().await;
/// ```
pub struct LiveClient {
    config: ClientConfig,
    policy: ReconnectPolicy,
    connector: Arc<dyn Connector>,
    handler: Arc<dyn MessageHandler>,
    session: Mutex<Session>,
    state_tx: watch::Sender<ConnectionState>,
    shutdown: CancellationToken,
    closing: AtomicBool,
    stats: Arc<SessionStats>,
}

impl LiveClient {
    pub fn new(
        config: ClientConfig,
        connector: Arc<dyn Connector>,
        handler: Arc<dyn MessageHandler>,
    ) -> Arc<Self> {
        let (state_tx, _) = watch::channel(ConnectionState::Disconnected);
        Arc::new(Self {
            policy: config.reconnect_policy(),
            config,
            connector,
            handler,
            session: Mutex::new(Session::default()),
            state_tx,
            shutdown: CancellationToken::new(),
            closing: AtomicBool::new(false),
            stats: Arc::new(SessionStats::new()),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Get the current connection state
    pub fn state(&self) -> ConnectionState {
        self.state_tx.borrow().clone()
    }

    /// Subscribe to connection state changes
    pub fn state_receiver(&self) -> watch::Receiver<ConnectionState> {
        self.state_tx.subscribe()
    }

    pub fn is_connected(&self) -> bool {
        matches!(*self.state_tx.borrow(), ConnectionState::Connected)
    }

    /// Whether [`LiveClient::close`] has been called.
    pub fn is_closed(&self) -> bool {
        self.closing.load(Ordering::SeqCst)
    }

    pub async fn reconnect_attempts(&self) -> u32 {
        self.session.lock().await.reconnect_attempts
    }

    /// Time since the current connection was established.
    pub async fn connection_duration(&self) -> Option<Duration> {
        self.session
            .lock()
            .await
            .connected_at
            .map(|at| at.elapsed())
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    fn set_state(&self, state: ConnectionState) {
        debug!(?state, "Connection state changed");
        self.state_tx.send_replace(state);
    }

    /// Connect to the room.
    ///
    /// On success the heartbeat and read loop are running and the reconnect
    /// counter is reset. A failure is returned as-is; only connection drops
    /// detected by the read loop are retried automatically.
    pub async fn connect(self: &Arc<Self>) -> Result<(), WsError> {
        if self.shutdown.is_cancelled() {
            return Err(WsError::Cancelled);
        }

        let url = self.config.room_url();
        self.set_state(ConnectionState::Connecting);
        info!(url = %url, "Connecting to room");

        let result = tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => Err(WsError::Cancelled),
            result = self.connector.connect(&url) => result,
        };

        let transport = match result {
            Ok(transport) => transport,
            Err(e) => {
                error!(error = %e, code = e.error_code(), "Connection failed");
                if !self.shutdown.is_cancelled() {
                    self.set_state(ConnectionState::Disconnected);
                }
                return Err(e);
            }
        };

        let mut session = self.session.lock().await;
        if self.shutdown.is_cancelled() {
            drop(session);
            transport.close().await;
            return Err(WsError::Cancelled);
        }

        if let Some(stale) = session.detach() {
            warn!("Replacing an existing connection");
            tokio::spawn(async move { stale.close().await });
        }

        let token = self.shutdown.child_token();
        session.generation += 1;
        session.transport = Some(transport.clone());
        session.connection_token = Some(token.clone());
        session.reconnect_attempts = 0;
        session.connected_at = Some(Instant::now());
        session.heartbeat = Some(spawn_heartbeat(
            transport.clone(),
            self.config.heartbeat_interval,
            token.clone(),
            self.stats.clone(),
        ));
        let generation = session.generation;
        self.set_state(ConnectionState::Connected);
        drop(session);

        info!(room_id = %self.config.room_id, "Connected");
        tokio::spawn(self.clone().read_loop(transport, token, generation));
        Ok(())
    }

    async fn read_loop(
        self: Arc<Self>,
        transport: Arc<dyn Transport>,
        token: CancellationToken,
        generation: u64,
    ) {
        loop {
            let frame = tokio::select! {
                biased;
                _ = token.cancelled() => {
                    debug!("Read loop cancelled");
                    return;
                }
                frame = transport.receive() => frame,
            };

            match frame {
                Ok(text) => {
                    // Malformed frames are logged inside and never end the loop
                    let _ = dispatch_frame(&text, self.handler.as_ref(), &self.stats);
                }
                Err(e) => {
                    self.on_connection_lost(transport, generation, e).await;
                    return;
                }
            }
        }
    }

    async fn on_connection_lost(
        self: Arc<Self>,
        transport: Arc<dyn Transport>,
        generation: u64,
        err: WsError,
    ) {
        let attempts = {
            let mut session = self.session.lock().await;
            if session.generation != generation {
                // A newer connection owns the session already
                return;
            }
            session.detach();
            session.reconnect_attempts
        };
        transport.close().await;

        if self.shutdown.is_cancelled() {
            return;
        }

        warn!(
            error = %err,
            code = err.error_code(),
            retryable = err.is_retryable(),
            "Connection lost"
        );
        self.set_state(ConnectionState::Disconnected);

        if self.policy.should_retry(attempts + 1) {
            self.clone().spawn_reconnect();
        } else {
            self.terminate(attempts);
        }
    }

    fn spawn_reconnect(self: Arc<Self>) {
        // Boxed so the connect -> read loop -> reconnect cycle has a nameable type
        let task: BoxFuture<'static, ()> = Box::pin(self.reconnect_loop());
        tokio::spawn(task);
    }

    async fn reconnect_loop(self: Arc<Self>) {
        loop {
            let attempt = {
                let mut session = self.session.lock().await;
                session.reconnect_attempts += 1;
                session.reconnect_attempts
            };
            let delay = self.policy.next_delay(attempt);

            self.set_state(ConnectionState::Reconnecting { attempt });
            info!(
                attempt,
                max_attempts = self.policy.max_attempts,
                delay_ms = delay.as_millis() as u64,
                "Scheduling reconnect"
            );

            tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => {
                    debug!("Shutdown requested during backoff");
                    return;
                }
                _ = tokio::time::sleep(delay) => {}
            }

            match self.connect().await {
                Ok(()) => {
                    info!(attempt, "Reconnected");
                    return;
                }
                Err(WsError::Cancelled) => return,
                Err(e) => {
                    warn!(
                        attempt,
                        error = %e,
                        retryable = e.is_retryable(),
                        "Reconnect attempt failed"
                    );
                    if !self.policy.should_retry(attempt + 1) {
                        self.terminate(attempt);
                        return;
                    }
                }
            }
        }
    }

    fn terminate(&self, attempts: u32) {
        let err = WsError::ReconnectExhausted(attempts);
        error!(attempts, "Failed to reconnect, giving up");
        self.set_state(ConnectionState::Terminated);
        self.handler.on_terminated(&err);
    }

    async fn live_transport(&self) -> Option<Arc<dyn Transport>> {
        self.session.lock().await.transport.clone()
    }

    async fn send_outbound(&self, message: &OutboundMessage) -> Result<(), WsError> {
        let transport = self.live_transport().await.ok_or(WsError::NotConnected)?;
        let payload = message.to_json()?;
        transport.send(payload).await
    }

    /// Send a heartbeat ping right away.
    pub async fn send_ping(&self) -> Result<(), WsError> {
        let result = self.send_outbound(&OutboundMessage::ping_now()).await;
        match &result {
            Ok(()) => {
                self.stats.record_ping();
                info!("Ping sent");
            }
            Err(e) => warn!(error = %e, "Failed to send ping"),
        }
        result
    }

    /// Ask the server to close the room subscription.
    ///
    /// The socket stays open until the server closes it, after which the
    /// usual reconnect policy applies.
    pub async fn send_close_request(&self) -> Result<(), WsError> {
        let result = self.send_outbound(&OutboundMessage::close_request()).await;
        match &result {
            Ok(()) => info!("Close request sent"),
            Err(e) => warn!(error = %e, "Failed to send close request"),
        }
        result
    }

    /// Shut the session down.
    ///
    /// Cancels the shutdown token, sends a best-effort close request when
    /// connected, waits [`CLOSE_GRACE_PERIOD`], then releases the socket.
    /// The send and the release are each bounded by the grace period.
    /// Only the first call does any work.
    pub async fn close(&self) {
        if self.closing.swap(true, Ordering::SeqCst) {
            debug!("Close already requested");
            return;
        }

        info!("Closing session");
        self.shutdown.cancel();
        self.set_state(ConnectionState::Closing);

        let (transport, heartbeat) = {
            let mut session = self.session.lock().await;
            let transport = session.detach();
            (transport, session.heartbeat.take())
        };

        if let Some(transport) = transport {
            match OutboundMessage::close_request().to_json() {
                Ok(payload) => {
                    match tokio::time::timeout(CLOSE_GRACE_PERIOD, transport.send(payload)).await {
                        Ok(Ok(())) => {}
                        Ok(Err(e)) => warn!(error = %e, "Close request not sent"),
                        Err(_) => warn!("Close request timed out"),
                    }
                }
                Err(e) => warn!(error = %e, "Failed to serialize close request"),
            }
            tokio::time::sleep(CLOSE_GRACE_PERIOD).await;
            if tokio::time::timeout(CLOSE_GRACE_PERIOD, transport.close())
                .await
                .is_err()
            {
                warn!("Transport close timed out");
            }
        }

        if let Some(heartbeat) = heartbeat {
            let _ = heartbeat.await;
        }

        self.set_state(ConnectionState::Disconnected);
        info!("Session closed");
    }
}
