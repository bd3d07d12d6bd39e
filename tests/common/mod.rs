//! Common test utilities for integration tests.
//!
//! This module provides a recording message handler, test configurations
//! and state wait helpers shared by the lifecycle and transport tests.
//!
//! # Example
//!
//! ```ignore
//! let handler = RecordingHandler::new();
//! let client = LiveClient::new(test_config(), Arc::new(connector), handler.clone());
//! client.connect().await?;
//! handler.wait_for_messages(1).await;
//! ```

#![allow(dead_code)]

pub mod server;

pub use server::*;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::Notify;

use tiklive::config::ClientConfig;
use tiklive::traits::WsError;
use tiklive::websocket::{ConnectionState, InboundMessage, LiveClient, MessageHandler};

/// Upper bound for any single wait in a test.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Room id used throughout the tests.
pub const TEST_ROOM: &str = "7514168917980400426";

/// Config with the production defaults for the test room.
pub fn test_config() -> ClientConfig {
    ClientConfig::new(TEST_ROOM)
}

/// Handler that records every routed message and termination.
#[derive(Default)]
pub struct RecordingHandler {
    messages: Mutex<Vec<InboundMessage>>,
    terminations: Mutex<Vec<WsError>>,
    notify: Notify,
}

impl RecordingHandler {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn messages(&self) -> Vec<InboundMessage> {
        self.messages.lock().unwrap().clone()
    }

    pub fn terminations(&self) -> Vec<WsError> {
        self.terminations.lock().unwrap().clone()
    }

    /// Wait until at least `count` messages were handled.
    pub async fn wait_for_messages(&self, count: usize) -> Vec<InboundMessage> {
        let wait = async {
            loop {
                let notified = self.notify.notified();
                tokio::pin!(notified);
                notified.as_mut().enable();
                if self.messages.lock().unwrap().len() >= count {
                    return;
                }
                notified.await;
            }
        };
        tokio::time::timeout(TEST_TIMEOUT, wait)
            .await
            .expect("timed out waiting for messages");
        self.messages()
    }
}

impl MessageHandler for RecordingHandler {
    fn on_message(&self, message: &InboundMessage) {
        self.messages.lock().unwrap().push(message.clone());
        self.notify.notify_waiters();
    }

    fn on_terminated(&self, error: &WsError) {
        self.terminations.lock().unwrap().push(error.clone());
    }
}

/// Wait until the client's state satisfies `predicate`, returning it.
pub async fn wait_for_state<F>(client: &LiveClient, predicate: F) -> ConnectionState
where
    F: Fn(&ConnectionState) -> bool,
{
    let mut rx = client.state_receiver();
    let state = tokio::time::timeout(TEST_TIMEOUT, rx.wait_for(|state| predicate(state)))
        .await
        .expect("timed out waiting for state")
        .expect("state channel closed");
    let state = state.clone();
    state
}
