//! Field mapping between ClickUp and Motion.
//!
//! Two pure functions, one per direction. Neither ever fails: a value that
//! cannot be interpreted (bad timestamp, non-numeric duration) is dropped from
//! the payload instead.
//!
//! | field       | ClickUp -> Motion (creation)    | Motion -> ClickUp (update)            |
//! |-------------|---------------------------------|---------------------------------------|
//! | name        | copied                          | —                                     |
//! | description | `text_content`, else legacy     | —                                     |
//! | due date    | ms epoch -> ISO-8601            | always: ISO -> ms epoch, or cleared   |
//! | estimate    | ms -> minutes (rounded)         | >0 min -> ms, 0 -> cleared            |
//! | status      | —                               | completed -> done status, never back  |
//! | assignees   | through the crosswalk           | —                                     |

use chrono::{NaiveDate, SecondsFormat};
use thiserror::Error;

use tasklink_core::config::SyncConfig;
use tasklink_core::task::{
    parse_epoch_millis, parse_iso8601, AutoScheduled, ClickUpTask, ClickUpTaskUpdate,
    DeadlineType, MotionTask, MotionTaskCreate,
};
use tasklink_core::{Crosswalk, FieldUpdate};

const MILLIS_PER_MINUTE: f64 = 60_000.0;

/// Run-wide settings the transformer needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformPolicy {
    /// ClickUp status written when a Motion task is completed.
    pub done_status: String,
    /// Motion schedule for the auto-scheduling block; `None` disables it.
    pub auto_schedule: Option<String>,
}

impl TransformPolicy {
    pub fn from_config(sync: &SyncConfig) -> Self {
        Self {
            done_status: sync.done_status.clone(),
            auto_schedule: sync
                .auto_schedule
                .enabled
                .then(|| sync.auto_schedule.schedule.clone()),
        }
    }
}

impl Default for TransformPolicy {
    fn default() -> Self {
        Self::from_config(&SyncConfig::default())
    }
}

/// Creation payload plus what was lost on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct CreationDraft {
    pub payload: MotionTaskCreate,
    /// ClickUp assignee ids with no crosswalk entry.
    pub unmapped_assignees: Vec<String>,
}

// ---------------------------------------------------------------------------
// ClickUp -> Motion
// ---------------------------------------------------------------------------

/// Project a new ClickUp task onto a Motion creation request.
///
/// `today` is the start date of the auto-scheduling block.
pub fn to_creation_payload(
    task: &ClickUpTask,
    workspace_id: &str,
    crosswalk: &Crosswalk,
    policy: &TransformPolicy,
    today: NaiveDate,
) -> CreationDraft {
    let due_date = task.due_date.as_deref().and_then(parse_epoch_millis);
    let (assignee_ids, unmapped_assignees) = map_assignees(task, crosswalk);

    let auto_scheduled = match &policy.auto_schedule {
        None => FieldUpdate::Keep,
        Some(schedule) => match build_auto_schedule(schedule, today, due_date.map(|d| d.date_naive())) {
            Ok(block) => FieldUpdate::Set(block),
            Err(reason) => {
                tracing::debug!(task = %task.id, %reason, "auto-scheduling block cleared");
                FieldUpdate::Clear
            }
        },
    };

    CreationDraft {
        payload: MotionTaskCreate {
            name: task.name.clone(),
            workspace_id: workspace_id.to_string(),
            description: description(task),
            due_date: due_date.map(|d| d.to_rfc3339_opts(SecondsFormat::Millis, true)),
            duration: estimate_minutes(task.time_estimate),
            assignee_ids,
            auto_scheduled,
        },
        unmapped_assignees,
    }
}

fn description(task: &ClickUpTask) -> Option<String> {
    let non_blank = |value: &Option<String>| value.as_ref().filter(|v| !v.trim().is_empty()).cloned();
    non_blank(&task.text_content).or_else(|| non_blank(&task.description))
}

/// Milliseconds to whole minutes; `None` when absent or when nothing
/// survives the rounding.
fn estimate_minutes(millis: Option<i64>) -> Option<i64> {
    let millis = millis.filter(|ms| *ms > 0)?;
    let minutes = (millis as f64 / MILLIS_PER_MINUTE).round() as i64;
    (minutes > 0).then_some(minutes)
}

fn map_assignees(task: &ClickUpTask, crosswalk: &Crosswalk) -> (Option<Vec<String>>, Vec<String>) {
    let mut mapped = Vec::new();
    let mut unmapped = Vec::new();
    for id in task.assignee_ids() {
        match crosswalk.resolve(id) {
            Some(motion_id) if !mapped.iter().any(|m| m == motion_id) => mapped.push(motion_id.to_string()),
            Some(_) => {}
            None => unmapped.push(id.to_string()),
        }
    }
    let mapped = (!mapped.is_empty()).then_some(mapped);
    (mapped, unmapped)
}

#[derive(Debug, Error, PartialEq, Eq)]
enum AutoScheduleError {
    #[error("schedule name is blank")]
    BlankSchedule,
    #[error("a soft deadline needs a due date")]
    NoDeadline,
    #[error("due date {due} is before start date {start}")]
    DeadlinePassed { due: NaiveDate, start: NaiveDate },
}

fn build_auto_schedule(
    schedule: &str,
    today: NaiveDate,
    due: Option<NaiveDate>,
) -> Result<AutoScheduled, AutoScheduleError> {
    if schedule.trim().is_empty() {
        return Err(AutoScheduleError::BlankSchedule);
    }
    let due = due.ok_or(AutoScheduleError::NoDeadline)?;
    if due < today {
        return Err(AutoScheduleError::DeadlinePassed { due, start: today });
    }
    Ok(AutoScheduled {
        start_date: today.format("%Y-%m-%d").to_string(),
        deadline_type: DeadlineType::Soft,
        schedule: schedule.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Motion -> ClickUp
// ---------------------------------------------------------------------------

/// Project a linked Motion task onto a ClickUp update.
///
/// An empty result ([`ClickUpTaskUpdate::is_empty`]) means "no write".
pub fn to_update_payload(task: &MotionTask, policy: &TransformPolicy) -> ClickUpTaskUpdate {
    // Due dates are owned by Motion after creation: always mirrored, a
    // missing one clears ClickUp's. Only an unreadable value is skipped.
    let due_date = match task.due_date.as_deref().map(str::trim) {
        None | Some("") => FieldUpdate::Clear,
        Some(raw) => match parse_iso8601(raw) {
            Some(due) => FieldUpdate::Set(due.timestamp_millis()),
            None => {
                tracing::debug!(task = %task.id, raw, "unreadable motion due date ignored");
                FieldUpdate::Keep
            }
        },
    };

    // Reopening in Motion must not downgrade ClickUp.
    let status = task.completed.then(|| policy.done_status.clone());

    let time_estimate = match task.duration.as_ref().map(|d| d.minutes()) {
        Some(Some(minutes)) if minutes > 0.0 => {
            FieldUpdate::Set((minutes * MILLIS_PER_MINUTE).round() as i64)
        }
        Some(Some(minutes)) if minutes == 0.0 => FieldUpdate::Clear,
        _ => FieldUpdate::Keep,
    };

    ClickUpTaskUpdate {
        due_date,
        status,
        time_estimate,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn clickup(value: serde_json::Value) -> ClickUpTask {
        serde_json::from_value(value).unwrap()
    }

    fn motion(value: serde_json::Value) -> MotionTask {
        serde_json::from_value(value).unwrap()
    }

    fn no_auto_schedule() -> TransformPolicy {
        TransformPolicy {
            done_status: "complete".to_string(),
            auto_schedule: None,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 11, 1).unwrap()
    }

    #[test]
    fn new_task_with_due_date_becomes_name_and_iso_due_date() {
        let task = clickup(json!({ "id": "a1", "name": "Draft spec", "due_date": "1700000000000" }));
        let draft = to_creation_payload(&task, "W1", &Crosswalk::new(), &no_auto_schedule(), today());

        assert_eq!(
            serde_json::to_value(&draft.payload).unwrap(),
            json!({
                "name": "Draft spec",
                "workspaceId": "W1",
                "dueDate": "2023-11-14T22:13:20.000Z"
            })
        );
        assert!(draft.unmapped_assignees.is_empty());
    }

    #[test]
    fn plain_text_content_wins_over_legacy_description() {
        let both = clickup(json!({
            "id": "a1", "name": "n",
            "description": "<p>legacy</p>", "text_content": "plain"
        }));
        let legacy_only = clickup(json!({ "id": "a2", "name": "n", "description": "legacy" }));
        let neither = clickup(json!({ "id": "a3", "name": "n", "text_content": "   " }));
        let policy = no_auto_schedule();
        let xw = Crosswalk::new();

        assert_eq!(to_creation_payload(&both, "W", &xw, &policy, today()).payload.description.as_deref(), Some("plain"));
        assert_eq!(to_creation_payload(&legacy_only, "W", &xw, &policy, today()).payload.description.as_deref(), Some("legacy"));
        assert_eq!(to_creation_payload(&neither, "W", &xw, &policy, today()).payload.description, None);
    }

    #[rstest]
    #[case(Some("not-a-number"))]
    #[case(Some(""))]
    #[case(None)]
    fn unreadable_or_missing_due_date_is_omitted(#[case] raw: Option<&str>) {
        let task = clickup(json!({ "id": "a1", "name": "n", "due_date": raw }));
        let draft = to_creation_payload(&task, "W", &Crosswalk::new(), &no_auto_schedule(), today());
        assert_eq!(draft.payload.due_date, None);
    }

    #[rstest]
    #[case(Some(90_000), Some(2))]
    #[case(Some(3_600_000), Some(60))]
    #[case(Some(30_000), Some(1))]
    #[case(Some(29_999), None)]
    #[case(Some(0), None)]
    #[case(Some(-60_000), None)]
    #[case(None, None)]
    fn estimate_converts_millis_to_rounded_minutes(#[case] millis: Option<i64>, #[case] minutes: Option<i64>) {
        let task = clickup(json!({ "id": "a1", "name": "n", "time_estimate": millis }));
        let draft = to_creation_payload(&task, "W", &Crosswalk::new(), &no_auto_schedule(), today());
        assert_eq!(draft.payload.duration, minutes);
    }

    #[test]
    fn assignees_map_through_crosswalk_and_report_gaps() {
        let mut crosswalk = Crosswalk::new();
        crosswalk.insert("81", "mu_ada");
        let task = clickup(json!({
            "id": "a1", "name": "n",
            "assignees": [{ "id": 81 }, { "id": 99 }]
        }));

        let draft = to_creation_payload(&task, "W", &crosswalk, &no_auto_schedule(), today());
        assert_eq!(draft.payload.assignee_ids, Some(vec!["mu_ada".to_string()]));
        assert_eq!(draft.unmapped_assignees, vec!["99".to_string()]);
    }

    #[test]
    fn no_source_assignees_omits_field() {
        let task = clickup(json!({ "id": "a1", "name": "n", "assignees": [] }));
        let draft = to_creation_payload(&task, "W", &Crosswalk::new(), &no_auto_schedule(), today());
        let body = serde_json::to_value(&draft.payload).unwrap();
        assert!(body.get("assigneeIds").is_none());
        assert!(draft.unmapped_assignees.is_empty());
    }

    #[test]
    fn auto_schedule_block_attached_with_soft_deadline() {
        let policy = TransformPolicy::default();
        let task = clickup(json!({ "id": "a1", "name": "n", "due_date": "1700000000000" }));
        let draft = to_creation_payload(&task, "W", &Crosswalk::new(), &policy, today());

        assert_eq!(
            serde_json::to_value(&draft.payload).unwrap()["autoScheduled"],
            json!({ "startDate": "2023-11-01", "deadlineType": "SOFT", "schedule": "Work Hours" })
        );
    }

    #[rstest]
    #[case(json!({ "id": "a1", "name": "n" }), "Work Hours")]
    #[case(json!({ "id": "a1", "name": "n", "due_date": "1600000000000" }), "Work Hours")]
    #[case(json!({ "id": "a1", "name": "n", "due_date": "1700000000000" }), "  ")]
    fn failed_auto_schedule_block_is_cleared_not_fatal(#[case] task: serde_json::Value, #[case] schedule: &str) {
        let policy = TransformPolicy {
            done_status: "complete".to_string(),
            auto_schedule: Some(schedule.to_string()),
        };
        let draft = to_creation_payload(&clickup(task), "W", &Crosswalk::new(), &policy, today());

        assert_eq!(draft.payload.auto_scheduled, FieldUpdate::Clear);
        let body = serde_json::to_value(&draft.payload).unwrap();
        assert_eq!(body["autoScheduled"], serde_json::Value::Null);
        assert!(body.as_object().unwrap().contains_key("autoScheduled"));
        assert_eq!(body["name"], "n");
    }

    #[test]
    fn completed_task_without_due_date_or_duration() {
        let task = motion(json!({ "id": "b9", "name": "n", "completed": true, "dueDate": null, "duration": 0 }));
        let update = to_update_payload(&task, &no_auto_schedule());

        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            json!({ "due_date": null, "status": "complete", "time_estimate": null })
        );
    }

    #[test]
    fn reopened_task_never_touches_status() {
        let task = motion(json!({ "id": "b1", "name": "n", "completed": false }));
        let update = to_update_payload(&task, &no_auto_schedule());
        assert_eq!(update.status, None);
        assert!(serde_json::to_value(&update).unwrap().get("status").is_none());
    }

    #[test]
    fn missing_due_date_clears_rather_than_omits() {
        let task = motion(json!({ "id": "b1", "name": "n" }));
        let update = to_update_payload(&task, &no_auto_schedule());
        assert_eq!(update.due_date, FieldUpdate::Clear);
        assert!(!update.is_empty());
    }

    #[test]
    fn due_date_converts_to_epoch_millis() {
        let task = motion(json!({ "id": "b1", "name": "n", "dueDate": "2023-11-14T22:13:20.000Z" }));
        let update = to_update_payload(&task, &no_auto_schedule());
        assert_eq!(update.due_date, FieldUpdate::Set(1_700_000_000_000));
    }

    #[rstest]
    #[case(json!(2), FieldUpdate::Set(120_000))]
    #[case(json!(0), FieldUpdate::Clear)]
    #[case(json!("NONE"), FieldUpdate::Keep)]
    #[case(json!(-5), FieldUpdate::Keep)]
    #[case(serde_json::Value::Null, FieldUpdate::Keep)]
    fn duration_maps_back_to_millis(#[case] duration: serde_json::Value, #[case] expected: FieldUpdate<i64>) {
        let task = motion(json!({ "id": "b1", "name": "n", "dueDate": "2023-11-14T22:13:20Z", "duration": duration }));
        assert_eq!(to_update_payload(&task, &no_auto_schedule()).time_estimate, expected);
    }

    #[test]
    fn unreadable_due_date_with_nothing_else_is_empty_update() {
        let task = motion(json!({ "id": "b1", "name": "n", "dueDate": "next tuesday", "completed": false }));
        let update = to_update_payload(&task, &no_auto_schedule());
        assert!(update.is_empty());
    }

    #[test]
    fn policy_from_config_respects_disabled_auto_schedule() {
        let mut sync = SyncConfig::default();
        sync.auto_schedule.enabled = false;
        sync.done_status = "closed".to_string();
        let policy = TransformPolicy::from_config(&sync);
        assert_eq!(policy.auto_schedule, None);
        assert_eq!(policy.done_status, "closed");
    }
}
