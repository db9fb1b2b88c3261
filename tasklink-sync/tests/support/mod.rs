//! In-memory stand-ins for the ClickUp and Motion APIs.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::json;

use tasklink_core::remote::{ClickUpApi, MotionApi, TaskStream};
use tasklink_core::task::{ClickUpTask, ClickUpTaskUpdate, MotionTask, MotionTaskCreate};
use tasklink_core::RemoteRequestError;

pub fn clickup_task(id: &str, name: &str, extra: serde_json::Value) -> ClickUpTask {
    let mut value = json!({ "id": id, "name": name });
    if let (Some(base), Some(extra)) = (value.as_object_mut(), extra.as_object()) {
        base.extend(extra.clone());
    }
    serde_json::from_value(value).expect("clickup task fixture")
}

/// Motion task fixture. Unless `extra` says otherwise it was edited a minute
/// from now, i.e. after any link the test has already recorded.
pub fn motion_task(id: &str, extra: serde_json::Value) -> MotionTask {
    let edited = Utc::now() + chrono::Duration::minutes(1);
    let mut value = json!({ "id": id, "name": format!("task {id}"), "updatedTime": iso(edited) });
    if let (Some(base), Some(extra)) = (value.as_object_mut(), extra.as_object()) {
        base.extend(extra.clone());
    }
    serde_json::from_value(value).expect("motion task fixture")
}

fn iso(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn changed(updated: Option<DateTime<Utc>>, since: DateTime<Utc>) -> bool {
    updated.map_or(true, |updated| updated > since)
}

// ---------------------------------------------------------------------------
// ClickUp
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeClickUp {
    /// (list id, task)
    pub tasks: Mutex<Vec<(String, ClickUpTask)>>,
    pub updates: Mutex<Vec<(String, ClickUpTaskUpdate)>>,
    pub failing_lists: Mutex<HashSet<String>>,
    pub panicking_lists: Mutex<HashSet<String>>,
    pub failing_updates: Mutex<HashSet<String>>,
}

impl FakeClickUp {
    pub fn add(&self, list_id: &str, task: ClickUpTask) {
        self.tasks.lock().unwrap().push((list_id.to_string(), task));
    }

    pub fn fail_list(&self, list_id: &str) {
        self.failing_lists.lock().unwrap().insert(list_id.to_string());
    }

    pub fn panic_on_list(&self, list_id: &str) {
        self.panicking_lists.lock().unwrap().insert(list_id.to_string());
    }

    pub fn fail_update(&self, task_id: &str) {
        self.failing_updates.lock().unwrap().insert(task_id.to_string());
    }

    pub fn updates(&self) -> Vec<(String, ClickUpTaskUpdate)> {
        self.updates.lock().unwrap().clone()
    }
}

impl ClickUpApi for FakeClickUp {
    fn changed_tasks<'a>(&'a self, list_id: &'a str, since: DateTime<Utc>) -> TaskStream<'a, ClickUpTask> {
        if self.panicking_lists.lock().unwrap().contains(list_id) {
            panic!("clickup fake asked to panic for list {list_id}");
        }
        if self.failing_lists.lock().unwrap().contains(list_id) {
            return Box::new(std::iter::once(Err(RemoteRequestError::status(
                format!("clickup list tasks (list {list_id})"),
                503,
                "unavailable",
            ))));
        }
        let tasks: Vec<_> = self
            .tasks
            .lock()
            .unwrap()
            .iter()
            .filter(|(list, task)| list == list_id && changed(task.updated_at(), since))
            .map(|(_, task)| Ok(task.clone()))
            .collect();
        Box::new(tasks.into_iter())
    }

    fn update_task(&self, task_id: &str, update: &ClickUpTaskUpdate) -> Result<ClickUpTask, RemoteRequestError> {
        if self.failing_updates.lock().unwrap().contains(task_id) {
            return Err(RemoteRequestError::status(
                format!("clickup update task {task_id}"),
                400,
                "bad status",
            ));
        }
        self.updates
            .lock()
            .unwrap()
            .push((task_id.to_string(), update.clone()));
        Ok(clickup_task(task_id, "updated", json!({})))
    }
}

// ---------------------------------------------------------------------------
// Motion
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeMotion {
    /// (workspace id, task)
    pub tasks: Mutex<Vec<(String, MotionTask)>>,
    pub created: Mutex<Vec<MotionTaskCreate>>,
    pub failing_names: Mutex<HashSet<String>>,
    pub failing_workspaces: Mutex<HashSet<String>>,
    /// Server-side time spent on each create before the task is stamped.
    pub create_latency: Mutex<Duration>,
    next_id: AtomicUsize,
}

impl FakeMotion {
    pub fn add(&self, workspace_id: &str, task: MotionTask) {
        self.tasks.lock().unwrap().push((workspace_id.to_string(), task));
    }

    pub fn fail_create_named(&self, name: &str) {
        self.failing_names.lock().unwrap().insert(name.to_string());
    }

    pub fn fail_workspace(&self, workspace_id: &str) {
        self.failing_workspaces.lock().unwrap().insert(workspace_id.to_string());
    }

    pub fn set_create_latency(&self, latency: Duration) {
        *self.create_latency.lock().unwrap() = latency;
    }

    /// Apply a user edit to an existing task, stamping it with the current
    /// time.
    pub fn edit(&self, task_id: &str, changes: serde_json::Value) {
        // Keep the stamp strictly after anything recorded just before.
        std::thread::sleep(Duration::from_millis(5));
        let mut tasks = self.tasks.lock().unwrap();
        let (_, task) = tasks
            .iter_mut()
            .find(|(_, task)| task.id == task_id)
            .expect("task to edit");
        let mut value = serde_json::to_value(&*task).expect("serialize motion task");
        if let (Some(base), Some(changes)) = (value.as_object_mut(), changes.as_object()) {
            base.extend(changes.clone());
            base.insert(
                "updatedTime".to_string(),
                json!(iso(Utc::now())),
            );
        }
        *task = serde_json::from_value(value).expect("edited motion task");
    }

    pub fn created(&self) -> Vec<MotionTaskCreate> {
        self.created.lock().unwrap().clone()
    }
}

impl MotionApi for FakeMotion {
    fn changed_tasks<'a>(&'a self, workspace_id: &'a str, since: DateTime<Utc>) -> TaskStream<'a, MotionTask> {
        if self.failing_workspaces.lock().unwrap().contains(workspace_id) {
            return Box::new(std::iter::once(Err(RemoteRequestError::transport(
                format!("motion list tasks (workspace {workspace_id})"),
                "connection reset",
            ))));
        }
        let tasks: Vec<_> = self
            .tasks
            .lock()
            .unwrap()
            .iter()
            .filter(|(ws, task)| ws == workspace_id && changed(task.updated_at(), since))
            .map(|(_, task)| Ok(task.clone()))
            .collect();
        Box::new(tasks.into_iter())
    }

    fn create_task(&self, task: &MotionTaskCreate) -> Result<MotionTask, RemoteRequestError> {
        if self.failing_names.lock().unwrap().contains(&task.name) {
            return Err(RemoteRequestError::status(
                format!("motion create task in workspace {}", task.workspace_id),
                422,
                "rejected",
            ));
        }
        let latency = *self.create_latency.lock().unwrap();
        if !latency.is_zero() {
            std::thread::sleep(latency);
        }
        let id = format!("b{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        let created = motion_task(
            &id,
            json!({
                "name": task.name,
                "dueDate": task.due_date,
                "duration": task.duration,
                "updatedTime": iso(Utc::now()),
            }),
        );
        self.created.lock().unwrap().push(task.clone());
        self.add(&task.workspace_id, created.clone());
        Ok(created)
    }
}
