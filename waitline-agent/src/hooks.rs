//! Page-level hooks: task list refresh and order display.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde_json::Value;
use tracing::{debug, warn};
use waitline_core::{OrderDisplay, TaskListRefresher};
use waitline_sdk::client::WaiterClient;

use crate::terminal::TerminalSink;

/// Re-fetches the task summary over HTTP and redraws it.
pub struct HttpTaskList {
    client: WaiterClient,
    sink: Arc<TerminalSink>,
}

impl HttpTaskList {
    pub fn new(client: WaiterClient, sink: Arc<TerminalSink>) -> Self {
        Self { client, sink }
    }
}

impl TaskListRefresher for HttpTaskList {
    fn refresh_task_list(&self) {
        let client = self.client.clone();
        let sink = Arc::clone(&self.sink);
        tokio::spawn(async move {
            match client.fetch_tasks().await {
                Ok(summary) => {
                    debug!(total = summary.total_tasks, "Task list refreshed");
                    sink.render_tasks(&summary);
                }
                Err(e) => warn!(error = %e, "Failed to refresh task list"),
            }
        });
    }
}

/// Latest known snapshot of each order, redrawn on change.
pub struct OrderBoard {
    orders: Mutex<HashMap<String, Value>>,
    sink: Arc<TerminalSink>,
}

impl OrderBoard {
    pub fn new(sink: Arc<TerminalSink>) -> Self {
        Self {
            orders: Mutex::new(HashMap::new()),
            sink,
        }
    }

    #[cfg(test)]
    pub fn get(&self, id: &str) -> Option<Value> {
        self.orders
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(id)
            .cloned()
    }
}

impl OrderDisplay for OrderBoard {
    fn update_order_display(&self, order: &Value) {
        let Some(id) = order.get("id").and_then(json_label) else {
            debug!(order = %order, "Order without an id, not tracked");
            return;
        };
        let status = order
            .get("status_display")
            .or_else(|| order.get("status"))
            .and_then(json_label)
            .unwrap_or_else(|| "unknown".to_string());

        self.orders
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(id.clone(), order.clone());
        self.sink.render_order(&id, &status);
    }
}

fn json_label(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
