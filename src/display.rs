//! Console rendering of routed room messages.

use chrono::Local;

use crate::traits::WsError;
use crate::websocket::{InboundMessage, MessageHandler};

/// Prints every routed message to stdout with a `HH:MM:SS` prefix.
#[derive(Debug, Default, Clone)]
pub struct ConsoleDisplay;

impl ConsoleDisplay {
    pub fn new() -> Self {
        Self
    }
}

impl MessageHandler for ConsoleDisplay {
    fn on_message(&self, message: &InboundMessage) {
        let clock = Local::now().format("%H:%M:%S").to_string();
        println!("{}", format_message(message, &clock));
    }

    fn on_terminated(&self, error: &WsError) {
        eprintln!("✗ {}. Giving up.", error);
    }
}

/// Render one message; `clock` is the already formatted time of day.
pub fn format_message(message: &InboundMessage, clock: &str) -> String {
    match message {
        InboundMessage::Status {
            status,
            step,
            total_steps,
            message,
        } => {
            let text = message.as_deref().unwrap_or(status);
            if status == "closing" {
                format!("🔄 [{}] {}", clock, text)
            } else if step.is_some() || total_steps.is_some() {
                format!(
                    "📡 [{}] {} ({}/{})",
                    clock,
                    text,
                    step.unwrap_or(0),
                    total_steps.unwrap_or(0)
                )
            } else {
                format!("📡 [{}] {}", clock, text)
            }
        }
        InboundMessage::Connected { message } => {
            format!(
                "🎉 [{}] {}",
                clock,
                message.as_deref().unwrap_or("Connected to room")
            )
        }
        InboundMessage::Pong {
            message,
            duration_label,
            ..
        } => {
            let mut out = format!(
                "💗 [{}] Heartbeat ok - {}",
                clock,
                message.as_deref().unwrap_or("pong")
            );
            if let Some(duration) = duration_label {
                out.push_str(&format!("\n⏱️  Connected for: {}", duration));
            }
            out
        }
        InboundMessage::ServerActivity { details } => format!(
            "📊 [{}] Server activity: {}",
            clock,
            details.as_deref().unwrap_or("-")
        ),
        InboundMessage::Gift {
            nickname,
            description,
            diamond_count,
        } => format!(
            "🎁 [{}] {} sent {} (worth {} diamonds)",
            clock, nickname, description, diamond_count
        ),
        InboundMessage::ErrorReport {
            error,
            detail,
            suggestion,
            reconnect,
        } => {
            let mut out = format!(
                "❌ [{}] Error: {}\n📄 Detail: {}",
                clock,
                error,
                detail.as_deref().unwrap_or("")
            );
            if let Some(suggestion) = suggestion {
                out.push_str(&format!("\n💡 Suggestion: {}", suggestion));
            }
            if *reconnect {
                out.push_str("\n🔁 The server will try to reconnect");
            }
            out
        }
        InboundMessage::Unrecognized { raw } => {
            let pretty = serde_json::to_string_pretty(raw).unwrap_or_else(|_| raw.to_string());
            format!("📨 [{}] Received message:\n{}", clock, pretty)
        }
    }
}
