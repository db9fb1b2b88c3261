//! Typed outcomes of a sync run.
//!
//! Every object the reconciler touches ends in exactly one
//! [`ObjectOutcome`] or one [`ObjectFailure`]; both fold into the pairing's
//! [`PairingReport`], and the reports fold into a [`RunSummary`].

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use tasklink_core::{Pairing, PairingId};

/// What happened to one object that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectOutcome {
    /// New ClickUp task mirrored into Motion and linked.
    Created {
        clickup_task_id: String,
        motion_task_id: String,
    },
    /// Linked Motion task pushed back onto ClickUp.
    Updated {
        motion_task_id: String,
        clickup_task_id: String,
    },
    /// ClickUp task is already linked; its edits are not propagated.
    AlreadyLinked,
    /// Linked Motion task produced an empty update.
    NoChanges,
    /// Linked Motion task not edited since the link was recorded.
    UntouchedSinceLink,
    /// Motion task with no link; Motion-originated tasks are not mirrored.
    Unlinked,
    /// Motion task created earlier in this very pass.
    Echo,
}

/// The remote or store call that failed for one object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    LinkLookup,
    CreateInMotion,
    LinkInsert,
    UpdateInClickUp,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::LinkLookup => "link lookup",
            Operation::CreateInMotion => "create in motion",
            Operation::LinkInsert => "link insert",
            Operation::UpdateInClickUp => "update in clickup",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectFailure {
    /// Id of the task being processed (ClickUp id when creating, Motion id
    /// when updating).
    pub task_id: String,
    pub operation: Operation,
    pub error: String,
}

/// Result of one completed pass over one pairing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PairingReport {
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub skipped: usize,
    /// Assignees dropped for lack of a crosswalk entry.
    pub assignee_gaps: usize,
    pub failures: Vec<ObjectFailure>,
    /// Cursor committed at the end of the pass.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<DateTime<Utc>>,
}

impl PairingReport {
    pub fn record(&mut self, outcome: &ObjectOutcome) {
        match outcome {
            ObjectOutcome::Created { .. } => self.created += 1,
            ObjectOutcome::Updated { .. } => self.updated += 1,
            ObjectOutcome::AlreadyLinked
            | ObjectOutcome::NoChanges
            | ObjectOutcome::UntouchedSinceLink => self.unchanged += 1,
            ObjectOutcome::Unlinked | ObjectOutcome::Echo => self.skipped += 1,
        }
    }

    pub fn record_failure(&mut self, failure: ObjectFailure) {
        self.failures.push(failure);
    }
}

/// Per-pairing entry of a [`RunSummary`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PairingResult {
    pub pairing_id: PairingId,
    pub name: String,
    #[serde(flatten)]
    pub status: PairingStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PairingStatus {
    Ok { report: PairingReport },
    Failed { error: String },
}

/// Everything one orchestrated run did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub pairings: Vec<PairingResult>,
}

impl RunSummary {
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            duration_ms: 0,
            pairings: Vec::new(),
        }
    }

    pub fn record_success(&mut self, pairing: &Pairing, report: PairingReport) {
        self.pairings.push(PairingResult {
            pairing_id: pairing.id,
            name: pairing.display_name(),
            status: PairingStatus::Ok { report },
        });
    }

    pub fn record_failure(&mut self, pairing: &Pairing, error: impl fmt::Display) {
        self.pairings.push(PairingResult {
            pairing_id: pairing.id,
            name: pairing.display_name(),
            status: PairingStatus::Failed {
                error: error.to_string(),
            },
        });
    }

    pub fn finish(&mut self, elapsed: Duration) {
        self.duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
    }

    pub fn reports(&self) -> impl Iterator<Item = &PairingReport> {
        self.pairings.iter().filter_map(|p| match &p.status {
            PairingStatus::Ok { report } => Some(report),
            PairingStatus::Failed { .. } => None,
        })
    }

    pub fn failed_pairings(&self) -> usize {
        self.pairings
            .iter()
            .filter(|p| matches!(p.status, PairingStatus::Failed { .. }))
            .count()
    }

    pub fn object_failures(&self) -> usize {
        self.reports().map(|r| r.failures.len()).sum()
    }

    pub fn created(&self) -> usize {
        self.reports().map(|r| r.created).sum()
    }

    pub fn updated(&self) -> usize {
        self.reports().map(|r| r.updated).sum()
    }

    /// True when at least one pairing or object failed.
    pub fn has_failures(&self) -> bool {
        self.failed_pairings() > 0 || self.object_failures() > 0
    }
}
