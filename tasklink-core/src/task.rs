//! Wire shapes of ClickUp and Motion tasks, and the payloads sent to each.
//!
//! Inbound structs are lenient: every optional field defaults, so one odd
//! task never fails a whole page. Interpretation of the raw values (epoch
//! strings, ISO dates, duration labels) happens in the transformer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::patch::FieldUpdate;

// ---------------------------------------------------------------------------
// ClickUp (system A)
// ---------------------------------------------------------------------------

/// A ClickUp task as returned by `GET /list/{id}/task` and `PUT /task/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClickUpTask {
    pub id: String,
    pub name: String,
    /// Legacy rich description.
    #[serde(default)]
    pub description: Option<String>,
    /// Plain-text rendering of the description.
    #[serde(default)]
    pub text_content: Option<String>,
    #[serde(default)]
    pub status: Option<ClickUpStatus>,
    /// Milliseconds since the Unix epoch, as a decimal string.
    #[serde(default)]
    pub due_date: Option<String>,
    /// Estimate in milliseconds.
    #[serde(default)]
    pub time_estimate: Option<i64>,
    #[serde(default)]
    pub assignees: Vec<ClickUpUser>,
    /// Milliseconds since the Unix epoch, as a decimal string.
    #[serde(default)]
    pub date_updated: Option<String>,
}

impl ClickUpTask {
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.date_updated.as_deref().and_then(parse_epoch_millis)
    }

    pub fn assignee_ids(&self) -> impl Iterator<Item = &str> {
        self.assignees.iter().map(|user| user.id.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClickUpStatus {
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClickUpUser {
    /// ClickUp sends numeric user ids; they are kept as strings.
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub username: Option<String>,
}

/// Body of `PUT /task/{id}`.
///
/// Built from a Motion task; see `tasklink_sync::transform::to_update_payload`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ClickUpTaskUpdate {
    /// Milliseconds since the Unix epoch; `Clear` removes the due date.
    #[serde(skip_serializing_if = "FieldUpdate::is_keep")]
    pub due_date: FieldUpdate<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Milliseconds; `Clear` removes the estimate.
    #[serde(skip_serializing_if = "FieldUpdate::is_keep")]
    pub time_estimate: FieldUpdate<i64>,
}

impl ClickUpTaskUpdate {
    /// True when no field would be sent; callers must skip the write.
    pub fn is_empty(&self) -> bool {
        self.due_date.is_keep() && self.status.is_none() && self.time_estimate.is_keep()
    }
}

// ---------------------------------------------------------------------------
// Motion (system B)
// ---------------------------------------------------------------------------

/// A Motion task as returned by `GET /tasks` and `POST /tasks`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MotionTask {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// ISO-8601 timestamp.
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub duration: Option<MotionDuration>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub assignees: Vec<MotionUser>,
    /// ISO-8601 timestamp.
    #[serde(default)]
    pub updated_time: Option<String>,
}

impl MotionTask {
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_time.as_deref().and_then(parse_iso8601)
    }
}

/// Motion reports durations either as minutes or as a label such as
/// `"NONE"` or `"REMINDER"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MotionDuration {
    Minutes(f64),
    Label(String),
}

impl MotionDuration {
    pub fn minutes(&self) -> Option<f64> {
        match self {
            MotionDuration::Minutes(minutes) if minutes.is_finite() => Some(*minutes),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotionUser {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Body of `POST /tasks`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MotionTaskCreate {
    pub name: String,
    pub workspace_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    /// Minutes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_ids: Option<Vec<String>>,
    /// `Clear` is sent as `null` when the block could not be built.
    #[serde(skip_serializing_if = "FieldUpdate::is_keep")]
    pub auto_scheduled: FieldUpdate<AutoScheduled>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoScheduled {
    /// `YYYY-MM-DD`.
    pub start_date: String,
    pub deadline_type: DeadlineType,
    /// Name of the Motion schedule (work-hours calendar).
    pub schedule: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DeadlineType {
    Hard,
    Soft,
    None,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse a millisecond-epoch decimal string; `None` on anything else.
pub fn parse_epoch_millis(raw: &str) -> Option<DateTime<Utc>> {
    let millis: i64 = raw.trim().parse().ok()?;
    DateTime::<Utc>::from_timestamp_millis(millis)
}

/// Parse an RFC 3339 / ISO-8601 timestamp into UTC; `None` on failure.
pub fn parse_iso8601(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Int(i64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Str(s) => s,
        Raw::Int(n) => n.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
