//! Tungstenite-based WebSocket adapter.
//!
//! This module provides the production [`Transport`] and [`Connector`]
//! implementations on top of `tokio-tungstenite`. The socket is split into a
//! sink and a stream, each behind its own mutex, so the read loop can park in
//! `receive` while the heartbeat and command surface write.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info};
use url::Url;

use crate::traits::{Connector, Transport, WsError};

/// Handshake timeout for a single connect attempt.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Opens [`TungsteniteTransport`] connections.
#[derive(Debug, Clone)]
pub struct TungsteniteConnector {
    connect_timeout: Duration,
}

impl TungsteniteConnector {
    pub fn new() -> Self {
        Self {
            connect_timeout: CONNECT_TIMEOUT,
        }
    }
}

impl Default for TungsteniteConnector {
    fn default() -> Self {
        Self::new()
    }
}

/// Check that `url` is an absolute `ws://` or `wss://` URL.
pub fn validate_ws_url(url: &str) -> Result<Url, WsError> {
    let parsed = Url::parse(url).map_err(|e| WsError::InvalidUrl(format!("{}: {}", url, e)))?;
    match parsed.scheme() {
        "ws" | "wss" => Ok(parsed),
        other => Err(WsError::InvalidUrl(format!(
            "{}: unsupported scheme '{}'",
            url, other
        ))),
    }
}

#[async_trait]
impl Connector for TungsteniteConnector {
    async fn connect(&self, url: &str) -> Result<Arc<dyn Transport>, WsError> {
        let url = validate_ws_url(url)?;

        let (ws_stream, response) =
            tokio::time::timeout(self.connect_timeout, connect_async(url.as_str()))
                .await
                .map_err(|_| {
                    WsError::Timeout(format!("handshake exceeded {:?}", self.connect_timeout))
                })?
                .map_err(|e| WsError::ConnectionFailed(e.to_string()))?;

        info!(url = %url, status = response.status().as_u16(), "WebSocket handshake complete");
        Ok(Arc::new(TungsteniteTransport::new(ws_stream)))
    }
}

/// One live websocket connection.
pub struct TungsteniteTransport {
    sink: Mutex<SplitSink<WsStream, Message>>,
    stream: Mutex<SplitStream<WsStream>>,
    closed: AtomicBool,
}

impl TungsteniteTransport {
    fn new(ws_stream: WsStream) -> Self {
        let (sink, stream) = ws_stream.split();
        Self {
            sink: Mutex::new(sink),
            stream: Mutex::new(stream),
            closed: AtomicBool::new(false),
        }
    }

    async fn write(&self, msg: Message) -> Result<(), WsError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(WsError::NotConnected);
        }
        self.sink
            .lock()
            .await
            .send(msg)
            .await
            .map_err(|e| WsError::SendFailed(e.to_string()))
    }
}

#[async_trait]
impl Transport for TungsteniteTransport {
    async fn send(&self, text: String) -> Result<(), WsError> {
        self.write(Message::Text(text)).await
    }

    async fn receive(&self) -> Result<String, WsError> {
        let mut stream = self.stream.lock().await;
        loop {
            match stream.next().await {
                Some(Ok(Message::Text(text))) => return Ok(text),
                Some(Ok(Message::Binary(data))) => match String::from_utf8(data) {
                    Ok(text) => return Ok(text),
                    Err(_) => debug!("Skipping non-UTF-8 binary frame"),
                },
                Some(Ok(Message::Ping(data))) => {
                    debug!("Received ping, sending pong");
                    let _ = self.write(Message::Pong(data)).await;
                }
                Some(Ok(Message::Close(frame))) => {
                    let reason = frame
                        .map(|f| format!("code {} {}", u16::from(f.code), f.reason))
                        .unwrap_or_else(|| "no close frame".to_string());
                    return Err(WsError::Closed(reason));
                }
                Some(Ok(_)) => {
                    // Pong and raw frames carry nothing for the caller
                }
                Some(Err(e)) => return Err(WsError::ReceiveFailed(e.to_string())),
                None => return Err(WsError::Closed("stream ended".to_string())),
            }
        }
    }

    async fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        let mut sink = self.sink.lock().await;
        if let Err(e) = sink.send(Message::Close(None)).await {
            debug!("Close frame not sent: {}", e);
        }
        let _ = sink.close().await;
    }
}
