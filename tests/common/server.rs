//! Loopback websocket server for transport tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::StreamExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{accept_hdr_async, WebSocketStream};

pub type ServerSocket = WebSocketStream<TcpStream>;

/// Accepts websocket connections on 127.0.0.1 and hands each one to the test
/// together with its request path.
pub struct TestServer {
    pub url: String,
    connections: mpsc::UnboundedReceiver<(String, ServerSocket)>,
}

impl TestServer {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let tx = tx.clone();
                tokio::spawn(async move {
                    let path = Arc::new(Mutex::new(String::new()));
                    let captured = path.clone();
                    let callback =
                        move |request: &Request, response: Response| -> Result<Response, ErrorResponse> {
                            *captured.lock().unwrap() = request.uri().path().to_string();
                            Ok(response)
                        };
                    if let Ok(socket) = accept_hdr_async(stream, callback).await {
                        let path = path.lock().unwrap().clone();
                        let _ = tx.send((path, socket));
                    }
                });
            }
        });

        Self {
            url: format!("ws://{}", addr),
            connections: rx,
        }
    }

    /// Wait for the next accepted connection.
    pub async fn next_connection(&mut self) -> (String, ServerSocket) {
        tokio::time::timeout(Duration::from_secs(5), self.connections.recv())
            .await
            .expect("timed out waiting for a connection")
            .expect("server stopped")
    }
}

/// Read the next text frame, skipping control frames.
pub async fn next_text(socket: &mut ServerSocket) -> String {
    let read = async {
        loop {
            match socket.next().await {
                Some(Ok(Message::Text(text))) => return text,
                Some(Ok(_)) => continue,
                other => panic!("expected a text frame, got {:?}", other),
            }
        }
    };
    tokio::time::timeout(Duration::from_secs(5), read)
        .await
        .expect("timed out waiting for a text frame")
}
