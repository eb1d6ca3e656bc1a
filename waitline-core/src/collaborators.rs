//! Hooks the connection manager calls into.
//!
//! The manager never renders anything or touches the task queue itself.
//! The hosting application provides these implementations:
//!
//! - [`PresentationSink`] renders connection health and notifications.
//! - [`TaskListRefresher`] re-fetches the task queue.
//! - [`OrderDisplay`] patches the representation of a single order.
//! - [`IdentityResolver`] names the channel this agent listens on.
//!
//! The two page-level hooks are optional; a missing hook is skipped.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use time::OffsetDateTime;
use uuid::Uuid;
use waitline_sdk::objects::NotificationLevel;

/// How long a notification stays on screen.
pub const NOTIFICATION_DISPLAY_WINDOW: Duration = Duration::from_secs(3);

/// A transient operator notification.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: Uuid,
    pub message: String,
    pub level: NotificationLevel,
    pub created_at: OffsetDateTime,
}

impl Notification {
    pub fn new(message: impl Into<String>, level: NotificationLevel) -> Self {
        Self {
            id: Uuid::new_v4(),
            message: message.into(),
            level,
            created_at: OffsetDateTime::now_utc(),
        }
    }
}

/// Renders connection status and notifications.
pub trait PresentationSink: Send + Sync {
    fn render_connection_status(&self, connected: bool);
    fn show_notification(&self, notification: Notification);
}

/// Re-fetches and redraws the task queue.
pub trait TaskListRefresher: Send + Sync {
    fn refresh_task_list(&self);
}

/// Patches a single order's representation.
pub trait OrderDisplay: Send + Sync {
    fn update_order_display(&self, order: &Value);
}

/// Resolves the identity embedded in the channel address.
///
/// Returns an empty string when nothing is known.
pub trait IdentityResolver {
    fn resolve(&self) -> String;
}

/// An identity known up front.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentity(pub String);

impl IdentityResolver for StaticIdentity {
    fn resolve(&self) -> String {
        self.0.clone()
    }
}

/// The set of hooks handed to the manager.
#[derive(Clone)]
pub struct Collaborators {
    pub presentation: Arc<dyn PresentationSink>,
    pub task_list: Option<Arc<dyn TaskListRefresher>>,
    pub order_display: Option<Arc<dyn OrderDisplay>>,
}

impl Collaborators {
    /// Collaborators with only a presentation sink.
    pub fn new(presentation: Arc<dyn PresentationSink>) -> Self {
        Self {
            presentation,
            task_list: None,
            order_display: None,
        }
    }

    pub fn with_task_list(mut self, task_list: Arc<dyn TaskListRefresher>) -> Self {
        self.task_list = Some(task_list);
        self
    }

    pub fn with_order_display(mut self, order_display: Arc<dyn OrderDisplay>) -> Self {
        self.order_display = Some(order_display);
        self
    }
}
