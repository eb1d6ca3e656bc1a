//! Terminal presentation.
//!
//! Prints the connection indicator, notifications, task summaries and
//! order changes as single lines. Live notifications are tracked on a
//! [`NotificationBoard`] and dismissed after the display window.

use std::io::Write;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::warn;
use waitline_core::{NOTIFICATION_DISPLAY_WINDOW, Notification, PresentationSink};
use waitline_sdk::objects::{NotificationLevel, TaskSummary};

/// Notifications currently on screen.
#[derive(Clone, Default)]
pub struct NotificationBoard {
    active: Arc<Mutex<Vec<Notification>>>,
}

impl NotificationBoard {
    /// Put `notification` on the board and schedule its dismissal.
    ///
    /// Must be called from within a tokio runtime.
    pub fn post(&self, notification: Notification) {
        let id = notification.id;
        lock(&self.active).push(notification);

        let active = Arc::clone(&self.active);
        tokio::spawn(async move {
            tokio::time::sleep(NOTIFICATION_DISPLAY_WINDOW).await;
            lock(&active).retain(|n| n.id != id);
        });
    }

    #[cfg(test)]
    pub fn active(&self) -> Vec<Notification> {
        lock(&self.active).clone()
    }
}

/// Writes presentation output to a terminal (or any writer).
pub struct TerminalSink {
    out: Mutex<Box<dyn Write + Send>>,
    connected: Mutex<Option<bool>>,
    board: NotificationBoard,
}

impl TerminalSink {
    pub fn stdout() -> Self {
        Self::with_writer(Box::new(std::io::stdout()))
    }

    pub fn with_writer(out: Box<dyn Write + Send>) -> Self {
        Self {
            out: Mutex::new(out),
            connected: Mutex::new(None),
            board: NotificationBoard::default(),
        }
    }

    #[cfg(test)]
    pub fn board(&self) -> &NotificationBoard {
        &self.board
    }

    /// Redraw the task queue summary.
    pub fn render_tasks(&self, summary: &TaskSummary) {
        self.line(&format!(
            "tasks: {} pending, {} ready for pickup ({} total)",
            summary.pending_orders, summary.ready_for_pickup, summary.total_tasks
        ));
    }

    /// Redraw a single order.
    pub fn render_order(&self, id: &str, status: &str) {
        self.line(&format!("order #{id}: {status}"));
    }

    fn line(&self, text: &str) {
        let mut out = lock(&self.out);
        if let Err(e) = writeln!(out, "{text}").and_then(|_| out.flush()) {
            warn!(error = %e, "Failed to write to terminal");
        }
    }
}

impl PresentationSink for TerminalSink {
    fn render_connection_status(&self, connected: bool) {
        // Only redraw on change.
        {
            let mut last = lock(&self.connected);
            if *last == Some(connected) {
                return;
            }
            *last = Some(connected);
        }

        if connected {
            self.line("● WebSocket Connected");
        } else {
            self.line("○ Reconnecting...");
        }
    }

    fn show_notification(&self, notification: Notification) {
        let time = notification.created_at.time();
        self.line(&format!(
            "{:02}:{:02}:{:02} [{}] {}",
            time.hour(),
            time.minute(),
            time.second(),
            level_label(notification.level),
            notification.message
        ));
        self.board.post(notification);
    }
}

fn level_label(level: NotificationLevel) -> &'static str {
    match level {
        NotificationLevel::Info => "INFO",
        NotificationLevel::Success => "OK",
        NotificationLevel::Warning => "WARN",
        NotificationLevel::Error => "ERROR",
    }
}

/// Lock a mutex, recovering the data if a writer panicked.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
