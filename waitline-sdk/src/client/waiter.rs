//! Waiter panel API client (agent → server).

use reqwest::Client;
use url::Url;

use super::ClientError;
use crate::objects::tasks::{TASKS_PATH, TaskSummary};

/// Typed HTTP client for the waiter panel API.
#[derive(Debug, Clone)]
pub struct WaiterClient {
    http: Client,
    base_url: Url,
    tasks_path: String,
}

impl WaiterClient {
    /// Create a new `WaiterClient` rooted at the server origin.
    pub fn new(base_url: Url) -> Self {
        Self {
            http: Client::new(),
            base_url,
            tasks_path: TASKS_PATH.to_string(),
        }
    }

    /// Replace the default `reqwest::Client` with a custom one.
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    /// Fetch tasks from a non-default path.
    pub fn with_tasks_path(mut self, path: impl Into<String>) -> Self {
        self.tasks_path = path.into();
        self
    }

    /// `GET /waiter/api/tasks/` – the waiter's pending task counts.
    pub async fn fetch_tasks(&self) -> Result<TaskSummary, ClientError> {
        let url = self.base_url.join(&self.tasks_path)?;

        let resp = self.http.get(url).send().await?;

        parse_response(resp).await
    }
}

async fn parse_response<T: serde::de::DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, ClientError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ClientError::Api { status, body });
    }
    let bytes = resp.bytes().await?;
    serde_json::from_slice(&bytes).map_err(ClientError::Json)
}
