//! Seams between the reconciler and the HTTP clients.
//!
//! Only the calls the reconciler makes are modelled: ClickUp tasks are read
//! and updated, Motion tasks are read and created. Implementations live in
//! `tasklink-remote`; tests substitute in-memory fakes.

use chrono::{DateTime, Utc};

use crate::error::RemoteRequestError;
use crate::task::{ClickUpTask, ClickUpTaskUpdate, MotionTask, MotionTaskCreate};

/// Lazily fetched sequence of remote tasks. An `Err` item means the fetch
/// itself failed and the sequence is incomplete.
pub type TaskStream<'a, T> = Box<dyn Iterator<Item = Result<T, RemoteRequestError>> + 'a>;

pub trait ClickUpApi: Send + Sync {
    /// Tasks in `list_id` updated strictly after `since`.
    fn changed_tasks<'a>(&'a self, list_id: &'a str, since: DateTime<Utc>) -> TaskStream<'a, ClickUpTask>;

    fn update_task(
        &self,
        task_id: &str,
        update: &ClickUpTaskUpdate,
    ) -> Result<ClickUpTask, RemoteRequestError>;
}

pub trait MotionApi: Send + Sync {
    /// Tasks in `workspace_id` updated strictly after `since`.
    fn changed_tasks<'a>(
        &'a self,
        workspace_id: &'a str,
        since: DateTime<Utc>,
    ) -> TaskStream<'a, MotionTask>;

    fn create_task(&self, task: &MotionTaskCreate) -> Result<MotionTask, RemoteRequestError>;
}
