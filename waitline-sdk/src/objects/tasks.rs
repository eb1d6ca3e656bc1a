//! REST objects of the waiter panel API.

use serde::{Deserialize, Serialize};

/// Path of the task summary endpoint, relative to the server origin.
pub const TASKS_PATH: &str = "/waiter/api/tasks/";

/// Response body of `GET /waiter/api/tasks/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TaskSummary {
    /// Orders that are pending or confirmed.
    pub pending_orders: u64,
    /// Orders that are ready and waiting for pickup.
    pub ready_for_pickup: u64,
    /// `pending_orders + ready_for_pickup`.
    pub total_tasks: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_summary_parsing() {
        let summary: TaskSummary = serde_json::from_str(
            r#"{"pending_orders":3,"ready_for_pickup":2,"total_tasks":5}"#,
        )
        .unwrap();
        assert_eq!(summary.pending_orders, 3);
        assert_eq!(summary.ready_for_pickup, 2);
        assert_eq!(summary.total_tasks, 5);
    }
}
