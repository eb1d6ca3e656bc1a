//! Inbound message routing.
//!
//! Every text frame from the live transport goes through
//! [`MessageRouter::dispatch`]. Frames that fail to decode are logged and
//! dropped, unknown `type`s are ignored, and every known type is handled
//! with defaults for missing fields. Nothing here can fail the connection.

use serde_json::Value;
use tracing::{debug, warn};
use waitline_sdk::objects::{InboundMessage, NotificationLevel, OrderUpdateKind};

use crate::collaborators::{Collaborators, Notification};

/// Label used when a `waiter_task` frame has no `task_type`.
pub const DEFAULT_TASK_LABEL: &str = "Order Update";

/// Routes decoded frames to the collaborator hooks.
pub struct MessageRouter {
    collaborators: Collaborators,
}

impl MessageRouter {
    pub fn new(collaborators: Collaborators) -> Self {
        Self { collaborators }
    }

    /// Decode `text` and invoke the handler matching its `type`.
    pub fn dispatch(&self, text: &str) {
        let message = match InboundMessage::decode(text) {
            Ok(message) => message,
            Err(e) => {
                warn!(error = %e, len = text.len(), "Error processing message");
                return;
            }
        };

        debug!(kind = message.kind(), "Received message");

        match message {
            InboundMessage::WaiterTask { task_type } => {
                self.handle_task_update(task_type.as_deref());
            }
            InboundMessage::OrderUpdate { update_type, order } => {
                self.handle_order_update(update_type.as_deref(), order.as_ref());
            }
            InboundMessage::Notification { message, level } => {
                self.handle_notification(message, level);
            }
            InboundMessage::Unknown => {
                debug!("Ignoring message with unhandled type");
            }
        }
    }

    fn handle_task_update(&self, task_type: Option<&str>) {
        if let Some(task_list) = &self.collaborators.task_list {
            task_list.refresh_task_list();
        }

        self.notify(task_notification_text(task_type), NotificationLevel::Info);
    }

    fn handle_order_update(&self, update_type: Option<&str>, order: Option<&Value>) {
        match (&self.collaborators.order_display, order) {
            (Some(display), Some(order)) => display.update_order_display(order),
            (Some(_), None) => debug!("order_update without an order, display not patched"),
            (None, _) => {}
        }

        let kind = OrderUpdateKind::from_update_type(update_type);
        self.notify(order_update_text(kind, order), NotificationLevel::Info);
    }

    fn handle_notification(&self, message: Option<String>, level: Option<NotificationLevel>) {
        let Some(message) = message else {
            debug!("notification without a message, nothing to show");
            return;
        };

        self.notify(message, level.unwrap_or_default());
    }

    fn notify(&self, message: String, level: NotificationLevel) {
        self.collaborators
            .presentation
            .show_notification(Notification::new(message, level));
    }
}

/// Text shown for a `waiter_task` frame.
pub fn task_notification_text(task_type: Option<&str>) -> String {
    let label = task_type
        .filter(|t| !t.is_empty())
        .unwrap_or(DEFAULT_TASK_LABEL);
    format!("New task: {label}")
}

/// Text shown for an `order_update` frame.
pub fn order_update_text(kind: OrderUpdateKind, order: Option<&Value>) -> String {
    match kind {
        OrderUpdateKind::StatusChanged => {
            format!("Order status changed to {}", order_status(order))
        }
        OrderUpdateKind::ItemAdded => "New item added to order".to_string(),
        OrderUpdateKind::OrderCancelled => "Order has been cancelled".to_string(),
        OrderUpdateKind::Other => "Order updated".to_string(),
    }
}

fn order_status(order: Option<&Value>) -> String {
    match order.and_then(|o| o.get("status")) {
        Some(Value::String(status)) => status.clone(),
        Some(Value::Null) | None => "unknown".to_string(),
        Some(other) => other.to_string(),
    }
}
