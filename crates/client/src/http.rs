//! REST implementation of [`TrackerClient`] over the tracker's HTTP API.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use itemflow_core::{Identity, WorkItem, WorkItemId};

use crate::error::ClientError;
use crate::traits::TrackerClient;

/// Talks to the tracker REST API with bearer-token auth.
///
/// One shared `reqwest::Client` provides connection pooling; constructing a
/// handle per project is cheap.
#[derive(Debug, Clone)]
pub struct RestTrackerClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
    project: String,
}

#[derive(Deserialize)]
struct QueryResponse {
    items: Vec<WorkItem>,
}

impl RestTrackerClient {
    /// Create a handle scoped to `project`.
    pub fn for_project(
        http: reqwest::Client,
        base_url: impl Into<String>,
        token: impl Into<String>,
        project: impl Into<String>,
    ) -> Self {
        let base_url = base_url.into();
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.into(),
            project: project.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn check(resp: reqwest::Response) -> Result<reqwest::Response, ClientError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(ClientError::Status {
            code: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl TrackerClient for RestTrackerClient {
    async fn get_work_item(&self, id: WorkItemId) -> Result<WorkItem, ClientError> {
        let url = self.url(&format!("/projects/{}/workitems/{}", self.project, id));
        debug!(id, "fetching work item");

        let resp = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound(id));
        }
        let resp = Self::check(resp).await?;
        resp.json::<WorkItem>()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))
    }

    async fn save_work_item(
        &self,
        item: &WorkItem,
        _escalate_errors: bool,
    ) -> Result<(), ClientError> {
        let url = self.url(&format!("/projects/{}/workitems/{}", self.project, item.id));
        debug!(id = item.id, rev = item.rev, "saving work item");

        let resp = self
            .http
            .patch(&url)
            .bearer_auth(&self.token)
            .json(item)
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }

    async fn query_work_items(&self, query: &str) -> Result<Vec<WorkItem>, ClientError> {
        let url = self.url(&format!("/projects/{}/wiql", self.project));
        debug!(query, "running work item query");

        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .json(&serde_json::json!({ "query": query }))
            .send()
            .await?;
        let resp = Self::check(resp).await?;
        let parsed: QueryResponse = resp
            .json()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))?;
        Ok(parsed.items)
    }

    async fn who_am_i(&self) -> Result<Identity, ClientError> {
        let resp = self
            .http
            .get(self.url("/me"))
            .bearer_auth(&self.token)
            .send()
            .await?;
        let resp = Self::check(resp).await?;
        resp.json::<Identity>()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))
    }

    fn project(&self) -> &str {
        &self.project
    }
}
