//! WebSocket message types for the waiter notification channel.
//!
//! The `GET /ws/waiters/{waiter_id}/` endpoint upgrades to a WebSocket
//! connection. The server pushes [`InboundMessage`] JSON frames and the
//! agent answers with [`ClientAction`] frames.
//!
//! # Protocol
//!
//! 1. Once the connection is open the agent sends
//!    `{"action":"get_tasks"}` to prime the server-side task state.
//! 2. The server pushes `waiter_task`, `order_update` and `notification`
//!    frames as the shared work queue changes.
//! 3. Any other `type` (the server also emits `connection`, `tasks_list`,
//!    `alert`, ...) decodes to [`InboundMessage::Unknown`] and is ignored.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Server-to-agent WebSocket message.
///
/// Serialized as an internally-tagged JSON object so the agent can
/// dispatch on the `"type"` field:
///
/// ```json
/// {"type":"waiter_task","task_type":"Call Waiter"}
/// {"type":"order_update","update_type":"status_changed","order":{"status":"ready"}}
/// {"type":"notification","message":"Table 4 needs help","level":"warning"}
/// ```
///
/// Every payload field is optional and decoded leniently: a field of the
/// wrong JSON type reads as absent (or, for text fields, as the JSON text
/// of a number or boolean), so it never fails the whole frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundMessage {
    /// A task was assigned to or changed for this waiter.
    WaiterTask {
        #[serde(default, deserialize_with = "lenient_text")]
        task_type: Option<String>,
    },

    /// A single order changed.
    OrderUpdate {
        #[serde(default, deserialize_with = "lenient_text")]
        update_type: Option<String>,
        /// The order as the server serialized it. Passed through to the
        /// order display untouched.
        #[serde(default)]
        order: Option<Value>,
    },

    /// A free-form notification to show to the operator.
    Notification {
        #[serde(default, deserialize_with = "lenient_text")]
        message: Option<String>,
        #[serde(default, deserialize_with = "lenient_level")]
        level: Option<NotificationLevel>,
    },

    /// Any `type` this agent does not understand.
    #[serde(other)]
    Unknown,
}

impl InboundMessage {
    /// Decode a text frame.
    pub fn decode(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// The `type` discriminator, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            InboundMessage::WaiterTask { .. } => "waiter_task",
            InboundMessage::OrderUpdate { .. } => "order_update",
            InboundMessage::Notification { .. } => "notification",
            InboundMessage::Unknown => "unknown",
        }
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => Some(text),
        value @ (Value::Number(_) | Value::Bool(_)) => Some(value.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    })
}

fn lenient_level<'de, D>(deserializer: D) -> Result<Option<NotificationLevel>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(level) => Some(NotificationLevel::from(level)),
        _ => None,
    })
}

/// The `update_type` of an `order_update` frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderUpdateKind {
    StatusChanged,
    ItemAdded,
    OrderCancelled,
    /// Missing or unrecognized `update_type`.
    Other,
}

impl OrderUpdateKind {
    pub fn from_update_type(update_type: Option<&str>) -> Self {
        match update_type {
            Some("status_changed") => OrderUpdateKind::StatusChanged,
            Some("item_added") => OrderUpdateKind::ItemAdded,
            Some("order_cancelled") => OrderUpdateKind::OrderCancelled,
            _ => OrderUpdateKind::Other,
        }
    }
}

/// Severity of an operator notification.
///
/// Unknown level strings decode as [`NotificationLevel::Info`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum NotificationLevel {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

impl From<String> for NotificationLevel {
    fn from(level: String) -> Self {
        match level.as_str() {
            "success" => NotificationLevel::Success,
            "warning" => NotificationLevel::Warning,
            "error" => NotificationLevel::Error,
            _ => NotificationLevel::Info,
        }
    }
}

impl std::fmt::Display for NotificationLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationLevel::Info => write!(f, "info"),
            NotificationLevel::Success => write!(f, "success"),
            NotificationLevel::Warning => write!(f, "warning"),
            NotificationLevel::Error => write!(f, "error"),
        }
    }
}

/// Agent-to-server message: a string-keyed JSON object.
pub type OutboundMessage = serde_json::Map<String, Value>;

/// Typed agent-to-server actions, tagged on `"action"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ClientAction {
    /// Ask the server for this waiter's pending tasks.
    GetTasks,
    /// Acknowledge a notification the server pushed.
    Acknowledge { notification_id: String },
}

impl ClientAction {
    /// Convert into the generic [`OutboundMessage`] mapping.
    pub fn to_message(&self) -> Result<OutboundMessage, serde_json::Error> {
        serde_json::from_value(serde_json::to_value(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_known_types() {
        let msg = InboundMessage::decode(r#"{"type":"waiter_task","task_type":"Call Waiter"}"#)
            .unwrap();
        assert_eq!(
            msg,
            InboundMessage::WaiterTask {
                task_type: Some("Call Waiter".to_string())
            }
        );

        let msg = InboundMessage::decode(
            r#"{"type":"order_update","update_type":"status_changed","order":{"id":7,"status":"ready"}}"#,
        )
        .unwrap();
        assert_eq!(
            msg,
            InboundMessage::OrderUpdate {
                update_type: Some("status_changed".to_string()),
                order: Some(json!({"id": 7, "status": "ready"})),
            }
        );
    }

    #[test]
    fn test_missing_fields_decode_as_none() {
        let msg = InboundMessage::decode(r#"{"type":"waiter_task"}"#).unwrap();
        assert_eq!(msg, InboundMessage::WaiterTask { task_type: None });

        let msg = InboundMessage::decode(r#"{"type":"notification","message":"hi"}"#).unwrap();
        assert_eq!(
            msg,
            InboundMessage::Notification {
                message: Some("hi".to_string()),
                level: None,
            }
        );
    }

    #[test]
    fn test_mistyped_fields_do_not_fail_the_frame() {
        let msg = InboundMessage::decode(r#"{"type":"waiter_task","task_type":7}"#).unwrap();
        assert_eq!(
            msg,
            InboundMessage::WaiterTask {
                task_type: Some("7".to_string())
            }
        );

        let msg = InboundMessage::decode(
            r#"{"type":"order_update","update_type":5,"order":{"id":1}}"#,
        )
        .unwrap();
        assert_eq!(
            msg,
            InboundMessage::OrderUpdate {
                update_type: Some("5".to_string()),
                order: Some(json!({"id": 1})),
            }
        );

        let msg = InboundMessage::decode(
            r#"{"type":"notification","message":{"text":"x"},"level":3}"#,
        )
        .unwrap();
        assert_eq!(
            msg,
            InboundMessage::Notification {
                message: None,
                level: None,
            }
        );

        let msg = InboundMessage::decode(r#"{"type":"waiter_task","task_type":null}"#).unwrap();
        assert_eq!(msg, InboundMessage::WaiterTask { task_type: None });
    }

    #[test]
    fn test_unknown_type_is_not_an_error() {
        let msg = InboundMessage::decode(r#"{"type":"tasks_list","tasks":[]}"#).unwrap();
        assert_eq!(msg, InboundMessage::Unknown);
        assert_eq!(msg.kind(), "unknown");
    }

    #[test]
    fn test_malformed_frames_fail_to_decode() {
        assert!(InboundMessage::decode("not json").is_err());
        assert!(InboundMessage::decode(r#"{"no_type":true}"#).is_err());
    }

    #[test]
    fn test_unknown_level_falls_back_to_info() {
        let msg =
            InboundMessage::decode(r#"{"type":"notification","message":"x","level":"critical"}"#)
                .unwrap();
        assert_eq!(
            msg,
            InboundMessage::Notification {
                message: Some("x".to_string()),
                level: Some(NotificationLevel::Info),
            }
        );

        let level: NotificationLevel = serde_json::from_str(r#""warning""#).unwrap();
        assert_eq!(level, NotificationLevel::Warning);
        assert_eq!(serde_json::to_string(&level).unwrap(), r#""warning""#);
    }

    #[test]
    fn test_update_kind() {
        assert_eq!(
            OrderUpdateKind::from_update_type(Some("item_added")),
            OrderUpdateKind::ItemAdded
        );
        assert_eq!(
            OrderUpdateKind::from_update_type(Some("order_cancelled")),
            OrderUpdateKind::OrderCancelled
        );
        assert_eq!(
            OrderUpdateKind::from_update_type(Some("refunded")),
            OrderUpdateKind::Other
        );
        assert_eq!(OrderUpdateKind::from_update_type(None), OrderUpdateKind::Other);
    }

    #[test]
    fn test_client_action_envelopes() {
        let get_tasks = ClientAction::GetTasks.to_message().unwrap();
        assert_eq!(serde_json::Value::Object(get_tasks), json!({"action": "get_tasks"}));

        let ack = ClientAction::Acknowledge {
            notification_id: "n-1".to_string(),
        }
        .to_message()
        .unwrap();
        assert_eq!(
            serde_json::Value::Object(ack),
            json!({"action": "acknowledge", "notification_id": "n-1"})
        );
    }
}
