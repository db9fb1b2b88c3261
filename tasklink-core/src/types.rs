//! Domain types for pairings, links and the identity crosswalk.
//!
//! Remote task shapes live in [`crate::task`]; this module holds only the
//! records tasklink itself persists.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Row id of a pairing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PairingId(pub i64);

impl fmt::Display for PairingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<i64> for PairingId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

// ---------------------------------------------------------------------------
// Persisted records
// ---------------------------------------------------------------------------

/// Binds one ClickUp list to one Motion workspace.
///
/// Pairings are edited administratively; the reconciler only reads them and
/// advances `last_sync_cursor`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pairing {
    pub id: PairingId,
    pub clickup_list_id: String,
    pub motion_workspace_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub last_sync_cursor: Option<DateTime<Utc>>,
    pub active: bool,
}

impl Pairing {
    /// `label` when present, otherwise `<list> -> <workspace>`.
    pub fn display_name(&self) -> String {
        match &self.label {
            Some(label) => label.clone(),
            None => format!("{} -> {}", self.clickup_list_id, self.motion_workspace_id),
        }
    }
}

/// A 1:1 correlation between a ClickUp task and the Motion task created for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub clickup_task_id: String,
    pub motion_task_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One row of the identity crosswalk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrosswalkEntry {
    pub clickup_user_id: String,
    pub motion_user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// In-memory ClickUp user id -> Motion user id lookup, loaded once per run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Crosswalk {
    users: HashMap<String, String>,
}

impl Crosswalk {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, clickup_user_id: impl Into<String>, motion_user_id: impl Into<String>) {
        self.users
            .insert(clickup_user_id.into(), motion_user_id.into());
    }

    pub fn resolve(&self, clickup_user_id: &str) -> Option<&str> {
        self.users.get(clickup_user_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl FromIterator<CrosswalkEntry> for Crosswalk {
    fn from_iter<I: IntoIterator<Item = CrosswalkEntry>>(iter: I) -> Self {
        let mut crosswalk = Crosswalk::new();
        for entry in iter {
            crosswalk.insert(entry.clickup_user_id, entry.motion_user_id);
        }
        crosswalk
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
