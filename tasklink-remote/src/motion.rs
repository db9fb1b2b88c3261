//! Motion API v1 client.
//!
//! - `GET  /tasks?workspaceId=&cursor=` — cursor pagination, no server-side
//!   "updated since" filter, so the whole workspace is paged and filtered
//!   here. This is the most expensive call of a pass.
//! - `POST /tasks` — create.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use tasklink_core::remote::{MotionApi, TaskStream};
use tasklink_core::task::{MotionTask, MotionTaskCreate};
use tasklink_core::{Config, ConfigError, Page, Pages, RemoteRequestError};

use crate::http::{self, join_url};

pub struct MotionClient {
    agent: ureq::Agent,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct TaskListResponse {
    #[serde(default)]
    tasks: Vec<MotionTask>,
    #[serde(default)]
    meta: Option<ListMeta>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListMeta {
    #[serde(default)]
    next_cursor: Option<String>,
}

impl MotionClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            agent: http::agent(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let api_key = config.motion_api_key()?;
        Ok(Self::new(config.motion.base_url.clone(), api_key))
    }

    fn fetch_page(
        &self,
        workspace_id: &str,
        cursor: Option<&str>,
    ) -> Result<Page<MotionTask>, RemoteRequestError> {
        let mut request = self
            .agent
            .get(&join_url(&self.base_url, "tasks"))
            .set("X-API-Key", &self.api_key)
            .query("workspaceId", workspace_id);
        if let Some(cursor) = cursor {
            request = request.query("cursor", cursor);
        }

        let operation = format!("motion list tasks (workspace {workspace_id})");
        let response: TaskListResponse = http::send(&operation, request, None::<&()>)?;
        tracing::debug!(
            workspace = workspace_id,
            count = response.tasks.len(),
            "motion page fetched",
        );
        Ok(into_page(response))
    }
}

fn into_page(response: TaskListResponse) -> Page<MotionTask> {
    let next = response
        .meta
        .and_then(|meta| meta.next_cursor)
        .filter(|cursor| !cursor.is_empty());
    Page {
        items: response.tasks,
        next,
    }
}

/// Client-side "changed since" filter. Tasks without a readable
/// `updatedTime` are kept; re-applying an update is harmless.
fn changed_after(task: &MotionTask, since: DateTime<Utc>) -> bool {
    task.updated_at().map_or(true, |updated| updated > since)
}

impl MotionApi for MotionClient {
    fn changed_tasks<'a>(
        &'a self,
        workspace_id: &'a str,
        since: DateTime<Utc>,
    ) -> TaskStream<'a, MotionTask> {
        let pages = Pages::new(move |cursor| self.fetch_page(workspace_id, cursor));
        Box::new(pages.filter(move |item| match item {
            Ok(task) => changed_after(task, since),
            Err(_) => true,
        }))
    }

    fn create_task(&self, task: &MotionTaskCreate) -> Result<MotionTask, RemoteRequestError> {
        let request = self
            .agent
            .post(&join_url(&self.base_url, "tasks"))
            .set("X-API-Key", &self.api_key);
        http::send(
            &format!("motion create task in workspace {}", task.workspace_id),
            request,
            Some(task),
        )
    }
}
