use serde::Serialize;
use serde_json::{Map, Value};

use crate::traits::WsError;

/// Nickname shown when a gift frame carries no user name.
pub const UNKNOWN_USER: &str = "unknown user";
/// Gift name shown when a gift frame carries no description.
pub const UNKNOWN_GIFT: &str = "unknown gift";

/// A decoded server frame before routing.
///
/// The server relays arbitrary live-room payloads, so fields are read by
/// presence rather than through a fixed schema. Fields with an unexpected
/// JSON type are treated as absent.
#[derive(Debug, Clone, PartialEq)]
pub struct WsFrame {
    fields: Map<String, Value>,
}

impl WsFrame {
    /// Decode a text frame. Anything other than a JSON object is malformed.
    pub fn parse(text: &str) -> Result<Self, WsError> {
        match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(fields)) => Ok(Self { fields }),
            Ok(other) => Err(WsError::Malformed(format!(
                "expected a JSON object, got {}",
                json_kind(&other)
            ))),
            Err(e) => Err(WsError::Malformed(e.to_string())),
        }
    }

    /// A string field, `None` when missing, not a string, or empty.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.fields
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    pub fn number(&self, key: &str) -> Option<u64> {
        self.fields.get(key).and_then(Value::as_u64)
    }

    /// A nested object field.
    pub fn object(&self, key: &str) -> Option<&Map<String, Value>> {
        self.fields.get(key).and_then(Value::as_object)
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Routed server message, one variant per display handler.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundMessage {
    /// Lifecycle progress (`connecting`, `getting_token`, `closing`, ...)
    Status {
        status: String,
        step: Option<u64>,
        total_steps: Option<u64>,
        message: Option<String>,
    },
    /// The server finished setting up the room
    Connected { message: Option<String> },
    /// Heartbeat reply
    Pong {
        message: Option<String>,
        duration_label: Option<String>,
        pong_count: Option<u64>,
    },
    /// Periodic server activity report
    ServerActivity { details: Option<String> },
    /// A viewer sent a gift
    Gift {
        nickname: String,
        description: String,
        diamond_count: u64,
    },
    /// Server-side failure report
    ErrorReport {
        error: String,
        detail: Option<String>,
        suggestion: Option<String>,
        reconnect: bool,
    },
    /// Anything else, kept whole for display
    Unrecognized { raw: Value },
}

impl InboundMessage {
    /// Decode and route a text frame.
    pub fn parse(text: &str) -> Result<Self, WsError> {
        WsFrame::parse(text).map(Self::route)
    }

    /// Route a frame by field presence.
    ///
    /// Precedence: non-empty `status`, then `type` of `pong` or
    /// `server_activity`, then `user` together with `gift`, then non-empty
    /// `error`, then unrecognized.
    pub fn route(frame: WsFrame) -> Self {
        if let Some(status) = frame.text("status") {
            let message = frame.text("message").map(str::to_string);
            if status == "connected" {
                return InboundMessage::Connected { message };
            }
            return InboundMessage::Status {
                status: status.to_string(),
                step: frame.number("step"),
                total_steps: frame.number("total_steps"),
                message,
            };
        }

        match frame.text("type") {
            Some("pong") => {
                return InboundMessage::Pong {
                    message: frame.text("message").map(str::to_string),
                    duration_label: frame.text("connection_duration").map(str::to_string),
                    pong_count: frame.number("pong_count"),
                }
            }
            Some("server_activity") => {
                return InboundMessage::ServerActivity {
                    details: frame.text("details").map(str::to_string),
                }
            }
            _ => {}
        }

        if let (Some(user), Some(gift)) = (frame.object("user"), frame.object("gift")) {
            let nickname = non_empty_str(user, "nickname").unwrap_or(UNKNOWN_USER);
            let description = non_empty_str(gift, "describe").unwrap_or(UNKNOWN_GIFT);
            return InboundMessage::Gift {
                nickname: nickname.to_string(),
                description: description.to_string(),
                diamond_count: gift.get("diamondCount").and_then(Value::as_u64).unwrap_or(0),
            };
        }

        if let Some(error) = frame.text("error") {
            return InboundMessage::ErrorReport {
                error: error.to_string(),
                detail: frame.text("detail").map(str::to_string),
                suggestion: frame.text("suggestion").map(str::to_string),
                reconnect: frame
                    .fields
                    .get("reconnect")
                    .and_then(Value::as_bool)
                    .unwrap_or(false),
            };
        }

        InboundMessage::Unrecognized {
            raw: frame.into_value(),
        }
    }

    /// Short label used in logs and statistics.
    pub fn kind(&self) -> &'static str {
        match self {
            InboundMessage::Status { .. } => "status",
            InboundMessage::Connected { .. } => "connected",
            InboundMessage::Pong { .. } => "pong",
            InboundMessage::ServerActivity { .. } => "server_activity",
            InboundMessage::Gift { .. } => "gift",
            InboundMessage::ErrorReport { .. } => "error",
            InboundMessage::Unrecognized { .. } => "unrecognized",
        }
    }
}

fn non_empty_str<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    map.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// Kind of frame the client sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutboundKind {
    Ping,
    CloseRequest,
}

/// Frame sent to the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub kind: OutboundKind,
    pub timestamp_millis: Option<i64>,
}

#[derive(Serialize)]
struct OutboundWire {
    #[serde(skip_serializing_if = "Option::is_none")]
    action: Option<&'static str>,
    #[serde(rename = "type")]
    type_: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp: Option<i64>,
}

impl OutboundMessage {
    pub fn ping(timestamp_millis: i64) -> Self {
        Self {
            kind: OutboundKind::Ping,
            timestamp_millis: Some(timestamp_millis),
        }
    }

    /// Ping stamped with the current wall clock.
    pub fn ping_now() -> Self {
        Self::ping(chrono::Utc::now().timestamp_millis())
    }

    pub fn close_request() -> Self {
        Self {
            kind: OutboundKind::CloseRequest,
            timestamp_millis: None,
        }
    }

    /// Serialize to the wire format.
    pub fn to_json(&self) -> Result<String, WsError> {
        let wire = match self.kind {
            OutboundKind::Ping => OutboundWire {
                action: None,
                type_: "ping",
                timestamp: self.timestamp_millis,
            },
            OutboundKind::CloseRequest => OutboundWire {
                action: Some("close"),
                type_: "close",
                timestamp: self.timestamp_millis,
            },
        };
        serde_json::to_string(&wire).map_err(|e| WsError::SendFailed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn route(value: Value) -> InboundMessage {
        InboundMessage::parse(&value.to_string()).unwrap()
    }

    #[test]
    fn test_status_progress() {
        let msg = route(json!({
            "status": "getting_token",
            "message": "fetching token",
            "step": 3,
            "total_steps": 4
        }));
        assert_eq!(
            msg,
            InboundMessage::Status {
                status: "getting_token".to_string(),
                step: Some(3),
                total_steps: Some(4),
                message: Some("fetching token".to_string()),
            }
        );
    }

    #[test]
    fn test_status_takes_precedence_over_type() {
        let msg = route(json!({"status": "connected", "type": "pong", "message": "hi"}));
        assert_eq!(
            msg,
            InboundMessage::Connected {
                message: Some("hi".to_string())
            }
        );
    }

    #[test]
    fn test_empty_status_falls_through() {
        let msg = route(json!({"status": "", "type": "pong"}));
        assert_eq!(msg.kind(), "pong");
    }

    #[test]
    fn test_pong_with_duration() {
        let msg = route(json!({
            "type": "pong",
            "message": "alive",
            "connection_duration": "00:05:00",
            "pong_count": 10
        }));
        assert_eq!(
            msg,
            InboundMessage::Pong {
                message: Some("alive".to_string()),
                duration_label: Some("00:05:00".to_string()),
                pong_count: Some(10),
            }
        );
    }

    #[test]
    fn test_server_activity() {
        let msg = route(json!({"type": "server_activity", "details": "3 rooms"}));
        assert_eq!(
            msg,
            InboundMessage::ServerActivity {
                details: Some("3 rooms".to_string())
            }
        );
    }

    #[test]
    fn test_type_beats_gift() {
        let msg = route(json!({
            "type": "server_activity",
            "user": {"nickname": "Alice"},
            "gift": {"describe": "Rose", "diamondCount": 1}
        }));
        assert_eq!(msg.kind(), "server_activity");
    }

    #[test]
    fn test_gift() {
        let msg = route(json!({
            "user": {"nickname": "Alice"},
            "gift": {"describe": "Rose", "diamondCount": 1}
        }));
        assert_eq!(
            msg,
            InboundMessage::Gift {
                nickname: "Alice".to_string(),
                description: "Rose".to_string(),
                diamond_count: 1,
            }
        );
    }

    #[test]
    fn test_gift_fallbacks() {
        let msg = route(json!({"user": {}, "gift": {}}));
        assert_eq!(
            msg,
            InboundMessage::Gift {
                nickname: UNKNOWN_USER.to_string(),
                description: UNKNOWN_GIFT.to_string(),
                diamond_count: 0,
            }
        );
    }

    #[test]
    fn test_gift_beats_error() {
        let msg = route(json!({
            "user": {"nickname": "Bob"},
            "gift": {"describe": "Lion"},
            "error": "ignored"
        }));
        assert_eq!(msg.kind(), "gift");
    }

    #[test]
    fn test_user_without_gift_is_not_a_gift() {
        let msg = route(json!({"user": {"nickname": "Bob"}, "content": "hello"}));
        assert_eq!(msg.kind(), "unrecognized");
    }

    #[test]
    fn test_error_report() {
        let msg = route(json!({
            "error": "bad_room",
            "detail": "room not live",
            "suggestion": "check id"
        }));
        assert_eq!(
            msg,
            InboundMessage::ErrorReport {
                error: "bad_room".to_string(),
                detail: Some("room not live".to_string()),
                suggestion: Some("check id".to_string()),
                reconnect: false,
            }
        );
    }

    #[test]
    fn test_error_report_reconnect_flag() {
        let msg = route(json!({"error": "unstable", "reconnect": true}));
        assert!(matches!(
            msg,
            InboundMessage::ErrorReport { reconnect: true, .. }
        ));
    }

    #[test]
    fn test_unrecognized_keeps_raw() {
        let raw = json!({"content": "hello", "likeCount": 5});
        let msg = route(raw.clone());
        assert_eq!(msg, InboundMessage::Unrecognized { raw });
    }

    #[test]
    fn test_mistyped_status_is_ignored() {
        let msg = route(json!({"status": 1, "error": "boom"}));
        assert_eq!(msg.kind(), "error");
    }

    #[test]
    fn test_malformed_json() {
        let result = InboundMessage::parse("{not json");
        assert!(matches!(result, Err(WsError::Malformed(_))));
    }

    #[test]
    fn test_non_object_json_is_malformed() {
        let result = InboundMessage::parse("[1,2,3]");
        match result {
            Err(WsError::Malformed(msg)) => assert!(msg.contains("an array")),
            other => panic!("Expected Malformed, got {:?}", other),
        }
    }

    #[test]
    fn test_serialize_ping() {
        let json = OutboundMessage::ping(1700000000000).to_json().unwrap();
        assert_eq!(json, r#"{"type":"ping","timestamp":1700000000000}"#);
    }

    #[test]
    fn test_serialize_close_request() {
        let json = OutboundMessage::close_request().to_json().unwrap();
        assert_eq!(json, r#"{"action":"close","type":"close"}"#);
    }

    #[test]
    fn test_ping_now_uses_wall_clock() {
        let before = chrono::Utc::now().timestamp_millis();
        let ping = OutboundMessage::ping_now();
        let ts = ping.timestamp_millis.unwrap();
        assert!(ts >= before);
        assert_eq!(ping.kind, OutboundKind::Ping);
    }
}
