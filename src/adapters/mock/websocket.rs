//! Mock WebSocket transport for testing.
//!
//! Provides a scripted [`Connector`] and an in-memory [`Transport`] that
//! allow frame injection, connection drops and outbound frame capture.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, Mutex, Notify};
use tokio_util::sync::CancellationToken;

use crate::traits::{Connector, Transport, WsError};

/// Mock websocket connection.
///
/// This mock allows:
/// - Injecting incoming frames
/// - Simulating a dropped connection
/// - Capturing outgoing frames
/// - Stalling sends
/// - Counting close calls
///
/// # Example
///
/// ```ignore
/// let transport = MockTransport::new();
/// transport.inject_message(r#"{"status":"connected","message":"ok"}"#);
/// transport.send("hello".to_string()).await?;
/// assert_eq!(transport.get_sent_messages().await, vec!["hello"]);
/// ```
pub struct MockTransport {
    incoming_tx: mpsc::UnboundedSender<Result<String, WsError>>,
    incoming_rx: Mutex<mpsc::UnboundedReceiver<Result<String, WsError>>>,
    sent_messages: Mutex<Vec<String>>,
    sent_notify: Notify,
    send_should_fail: AtomicBool,
    send_should_stall: AtomicBool,
    closed: CancellationToken,
    close_calls: AtomicUsize,
}

impl MockTransport {
    pub fn new() -> Self {
        let (incoming_tx, incoming_rx) = mpsc::unbounded_channel();
        Self {
            incoming_tx,
            incoming_rx: Mutex::new(incoming_rx),
            sent_messages: Mutex::new(Vec::new()),
            sent_notify: Notify::new(),
            send_should_fail: AtomicBool::new(false),
            send_should_stall: AtomicBool::new(false),
            closed: CancellationToken::new(),
            close_calls: AtomicUsize::new(0),
        }
    }

    /// Inject an incoming text frame.
    pub fn inject_message(&self, text: impl Into<String>) {
        // Ignore send errors (receiver dropped)
        let _ = self.incoming_tx.send(Ok(text.into()));
    }

    /// Make the next `receive` fail, as if the socket dropped.
    pub fn simulate_disconnect(&self) {
        let _ = self
            .incoming_tx
            .send(Err(WsError::ReceiveFailed("connection reset".to_string())));
    }

    /// Get all sent frames.
    pub async fn get_sent_messages(&self) -> Vec<String> {
        self.sent_messages.lock().await.clone()
    }

    /// Wait until at least `count` frames have been sent.
    pub async fn wait_for_sent(&self, count: usize) {
        loop {
            let notified = self.sent_notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.sent_messages.lock().await.len() >= count {
                return;
            }
            notified.await;
        }
    }

    /// Configure whether send should fail.
    pub fn set_send_should_fail(&self, should_fail: bool) {
        self.send_should_fail.store(should_fail, Ordering::SeqCst);
    }

    /// Make every send block forever, like a peer that stopped reading.
    pub fn set_send_should_stall(&self, should_stall: bool) {
        self.send_should_stall.store(should_stall, Ordering::SeqCst);
    }

    /// Whether `close` has been called.
    pub fn is_closed(&self) -> bool {
        self.closed.is_cancelled()
    }

    /// Number of times `close` has been called.
    pub fn close_calls(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, text: String) -> Result<(), WsError> {
        if self.closed.is_cancelled() {
            return Err(WsError::NotConnected);
        }
        if self.send_should_fail.load(Ordering::SeqCst) {
            return Err(WsError::SendFailed("Mock send failure".to_string()));
        }
        if self.send_should_stall.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }

        self.sent_messages.lock().await.push(text);
        self.sent_notify.notify_waiters();
        Ok(())
    }

    async fn receive(&self) -> Result<String, WsError> {
        let mut rx = self.incoming_rx.lock().await;
        tokio::select! {
            biased;
            _ = self.closed.cancelled() => Err(WsError::Closed("closed locally".to_string())),
            frame = rx.recv() => frame.unwrap_or_else(|| Err(WsError::Closed("stream ended".to_string()))),
        }
    }

    async fn close(&self) {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
        self.closed.cancel();
    }
}

/// Scripted connector handing out [`MockTransport`]s.
///
/// Outcomes queued with [`MockConnector::fail_next`] are consumed first;
/// once the queue is empty every connect succeeds.
#[derive(Clone, Default)]
pub struct MockConnector {
    inner: Arc<MockConnectorInner>,
}

#[derive(Default)]
struct MockConnectorInner {
    outcomes: Mutex<VecDeque<WsError>>,
    connections: Mutex<Vec<Arc<MockTransport>>>,
    urls: Mutex<Vec<String>>,
    attempts: AtomicUsize,
    notify: Notify,
}

impl MockConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a failure for the next connect attempt.
    pub async fn fail_next(&self, err: WsError) {
        self.inner.outcomes.lock().await.push_back(err);
    }

    /// Number of connect attempts, successful or not.
    pub fn attempts(&self) -> usize {
        self.inner.attempts.load(Ordering::SeqCst)
    }

    /// URLs passed to `connect`, in order.
    pub async fn urls(&self) -> Vec<String> {
        self.inner.urls.lock().await.clone()
    }

    /// Number of connections handed out.
    pub async fn connection_count(&self) -> usize {
        self.inner.connections.lock().await.len()
    }

    /// The most recent connection handed out.
    pub async fn latest(&self) -> Option<Arc<MockTransport>> {
        self.inner.connections.lock().await.last().cloned()
    }

    /// Wait until at least `count` connect attempts have been made.
    pub async fn wait_for_attempts(&self, count: usize) {
        loop {
            let notified = self.inner.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.attempts() >= count {
                return;
            }
            notified.await;
        }
    }
}

#[async_trait]
impl Connector for MockConnector {
    async fn connect(&self, url: &str) -> Result<Arc<dyn Transport>, WsError> {
        self.inner.urls.lock().await.push(url.to_string());
        let outcome = self.inner.outcomes.lock().await.pop_front();

        let result = match outcome {
            Some(err) => Err(err),
            None => {
                let transport = Arc::new(MockTransport::new());
                self.inner.connections.lock().await.push(transport.clone());
                Ok(transport as Arc<dyn Transport>)
            }
        };

        self.inner.attempts.fetch_add(1, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_inject_and_receive() {
        let transport = MockTransport::new();
        transport.inject_message("first");
        transport.inject_message("second");

        assert_eq!(transport.receive().await.unwrap(), "first");
        assert_eq!(transport.receive().await.unwrap(), "second");
    }

    #[tokio::test]
    async fn test_simulate_disconnect() {
        let transport = MockTransport::new();
        transport.simulate_disconnect();

        let result = transport.receive().await;
        assert!(matches!(result, Err(WsError::ReceiveFailed(_))));
    }

    #[tokio::test]
    async fn test_send_captures_frames() {
        let transport = MockTransport::new();
        transport.send("ping".to_string()).await.unwrap();

        assert_eq!(transport.get_sent_messages().await, vec!["ping".to_string()]);
    }

    #[tokio::test]
    async fn test_send_failure() {
        let transport = MockTransport::new();
        transport.set_send_should_fail(true);

        let result = transport.send("ping".to_string()).await;
        assert!(matches!(result, Err(WsError::SendFailed(_))));
        assert!(transport.get_sent_messages().await.is_empty());
    }

    #[tokio::test]
    async fn test_close_wakes_receiver_and_blocks_sends() {
        let transport = Arc::new(MockTransport::new());
        let reader = transport.clone();
        let handle = tokio::spawn(async move { reader.receive().await });

        transport.close().await;

        let result = handle.await.unwrap();
        assert!(matches!(result, Err(WsError::Closed(_))));
        assert!(transport.is_closed());
        assert!(matches!(
            transport.send("late".to_string()).await,
            Err(WsError::NotConnected)
        ));
    }

    #[tokio::test]
    async fn test_connector_scripted_failures() {
        let connector = MockConnector::new();
        connector
            .fail_next(WsError::ConnectionFailed("refused".to_string()))
            .await;

        assert!(connector.connect("ws://a/ws/1").await.is_err());
        assert!(connector.connect("ws://a/ws/1").await.is_ok());

        assert_eq!(connector.attempts(), 2);
        assert_eq!(connector.connection_count().await, 1);
        assert_eq!(connector.urls().await.len(), 2);
    }

    #[tokio::test]
    async fn test_connector_clone_shares_state() {
        let connector = MockConnector::new();
        let cloned = connector.clone();

        cloned.connect("ws://a/ws/1").await.unwrap();

        assert_eq!(connector.attempts(), 1);
        assert!(connector.latest().await.is_some());
    }
}
