//! HTTP client for the external store

use crate::store::TaskStore;
use crate::wire::{AggregationRequest, ErrorReply, TaskUpdate};
use async_trait::async_trait;
use hindsight_core::TasksMetrics;
use hindsight_model::{Error, Event, Flag, Project, Result, Session, Task};
use serde::de::DeserializeOwned;

/// Client for the store's request/response boundary.
///
/// Carries the base URL and a bearer credential as opaque parameters.
/// Every call is a single attempt; failures surface as `Transport` with a
/// human-readable description for notification display.
pub struct StoreClient {
    http: reqwest::Client,
    base_url: String,
    bearer_token: String,
}

impl StoreClient {
    pub fn new(base_url: impl Into<String>, bearer_token: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            http: reqwest::Client::new(),
            base_url,
            bearer_token: bearer_token.into(),
        }
    }

    /// Project record including the event vocabulary
    pub async fn fetch_project(&self, project_id: &str) -> Result<Project> {
        let url = format!("{}/projects/{}", self.base_url, project_id);
        tracing::debug!(%url, "fetching project");
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.bearer_token)
            .send()
            .await
            .map_err(|e| Error::transport(e.to_string()))?;
        parse_response(response).await
    }

    /// Sessions with nested tasks and events for a project
    pub async fn fetch_sessions(&self, project_id: &str) -> Result<Vec<Session>> {
        let url = format!("{}/projects/{}/sessions", self.base_url, project_id);
        tracing::debug!(%url, "fetching sessions");
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.bearer_token)
            .send()
            .await
            .map_err(|e| Error::transport(e.to_string()))?;
        parse_response(response).await
    }

    /// Flat task records for a project, including session-less tasks
    pub async fn fetch_tasks(&self, project_id: &str) -> Result<Vec<Task>> {
        let url = format!("{}/projects/{}/tasks", self.base_url, project_id);
        tracing::debug!(%url, "fetching tasks");
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.bearer_token)
            .send()
            .await
            .map_err(|e| Error::transport(e.to_string()))?;
        parse_response(response).await
    }

    /// Ask the store to aggregate; the filter travels as the same
    /// `tasks_filter` value the local engine evaluates
    pub async fn aggregate_metrics(
        &self,
        project_id: &str,
        request: &AggregationRequest,
    ) -> Result<TasksMetrics> {
        let url = format!("{}/explore/{}/aggregated/tasks", self.base_url, project_id);
        tracing::debug!(%url, metrics = request.metrics.len(), "requesting aggregation");
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.bearer_token)
            .json(request)
            .send()
            .await
            .map_err(|e| Error::transport(e.to_string()))?;
        parse_response(response).await
    }

    /// Submit a mutation; the store echoes the confirmed task
    pub async fn update_task(&self, task_id: &str, update: &TaskUpdate) -> Result<Task> {
        let url = format!("{}/tasks/{}", self.base_url, task_id);
        tracing::debug!(%url, "submitting task mutation");
        let response = self
            .http
            .patch(&url)
            .bearer_auth(&self.bearer_token)
            .json(update)
            .send()
            .await
            .map_err(|e| Error::transport(e.to_string()))?;
        parse_response(response).await
    }
}

#[async_trait]
impl TaskStore for StoreClient {
    async fn update_events(&self, task_id: &str, events: &[Event]) -> Result<Task> {
        self.update_task(task_id, &TaskUpdate::with_events(events.to_vec()))
            .await
    }

    async fn set_flag(&self, task_id: &str, flag: Flag) -> Result<Task> {
        self.update_task(task_id, &TaskUpdate::with_flag(flag)).await
    }
}

async fn parse_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    if status == reqwest::StatusCode::NOT_FOUND {
        let url = response.url().path().to_string();
        return Err(Error::NotFound(url));
    }
    if !status.is_success() {
        let description = match response.json::<ErrorReply>().await {
            Ok(reply) => reply.error,
            Err(_) => format!("store returned {status}"),
        };
        return Err(Error::transport(description));
    }
    response
        .json()
        .await
        .map_err(|e| Error::transport(format!("malformed store response: {e}")))
}
