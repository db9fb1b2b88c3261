//! ClickUp API v2 client.
//!
//! - `GET  /list/{list_id}/task?page=N&date_updated_gt=<ms>` — server-side
//!   "changed since" filter, page-number pagination.
//! - `PUT  /task/{task_id}` — partial update.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use tasklink_core::remote::{ClickUpApi, TaskStream};
use tasklink_core::task::{ClickUpTask, ClickUpTaskUpdate};
use tasklink_core::{Config, ConfigError, Page, Pages, RemoteRequestError};

use crate::http::{self, join_url};

pub struct ClickUpClient {
    agent: ureq::Agent,
    base_url: String,
    token: String,
}

#[derive(Debug, Deserialize)]
struct TaskListResponse {
    #[serde(default)]
    tasks: Vec<ClickUpTask>,
    #[serde(default)]
    last_page: Option<bool>,
}

impl ClickUpClient {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            agent: http::agent(),
            base_url: base_url.into(),
            token: token.into(),
        }
    }

    /// Build from configuration; fails on a missing or placeholder token.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let token = config.clickup_token()?;
        Ok(Self::new(config.clickup.base_url.clone(), token))
    }

    fn fetch_page(
        &self,
        list_id: &str,
        since: DateTime<Utc>,
        cursor: Option<&str>,
    ) -> Result<Page<ClickUpTask>, RemoteRequestError> {
        let operation = format!("clickup list tasks (list {list_id})");
        let page: u32 = match cursor {
            Some(raw) => raw.parse().map_err(|_| {
                RemoteRequestError::transport(&operation, format!("invalid page token '{raw}'"))
            })?,
            None => 0,
        };

        let request = self
            .agent
            .get(&join_url(&self.base_url, &format!("list/{list_id}/task")))
            .set("Authorization", &self.token)
            .query("page", &page.to_string())
            .query("date_updated_gt", &since.timestamp_millis().to_string())
            .query("include_closed", "true")
            .query("subtasks", "true")
            .query("order_by", "updated");

        let response: TaskListResponse = http::send(&operation, request, None::<&()>)?;
        tracing::debug!(list = list_id, page, count = response.tasks.len(), "clickup page fetched");
        Ok(into_page(page, response))
    }
}

fn into_page(page: u32, response: TaskListResponse) -> Page<ClickUpTask> {
    // Older API versions omit `last_page`; an empty page ends the scan then.
    let next = match response.last_page {
        Some(true) => None,
        _ if response.tasks.is_empty() => None,
        _ => Some((page + 1).to_string()),
    };
    Page {
        items: response.tasks,
        next,
    }
}

impl ClickUpApi for ClickUpClient {
    fn changed_tasks<'a>(&'a self, list_id: &'a str, since: DateTime<Utc>) -> TaskStream<'a, ClickUpTask> {
        Box::new(Pages::new(move |cursor| self.fetch_page(list_id, since, cursor)))
    }

    fn update_task(
        &self,
        task_id: &str,
        update: &ClickUpTaskUpdate,
    ) -> Result<ClickUpTask, RemoteRequestError> {
        let request = self
            .agent
            .put(&join_url(&self.base_url, &format!("task/{task_id}")))
            .set("Authorization", &self.token);
        http::send(&format!("clickup update task {task_id}"), request, Some(update))
    }
}
