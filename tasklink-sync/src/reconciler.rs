//! One reconciliation pass over one pairing.
//!
//! ```text
//! start = now
//! since = cursor(pairing)                     epoch when never synced
//! A     = clickup.changed_tasks(list, since)  fully drained; error aborts
//! for a in A:    unlinked -> create in Motion, link           (per-object)
//! for b in motion.changed_tasks(ws, since):   error aborts
//!                linked, edited after link -> update ClickUp  (per-object)
//! commit cursor(pairing) = start              only when nothing aborted
//! ```
//!
//! The cursor is the *start* of the pass, so anything edited while the pass
//! runs is picked up again next time. Per-object failures are recorded and
//! logged but never abort the pass.

use std::collections::HashSet;

use chrono::{DateTime, Local, NaiveDate, Utc};

use tasklink_core::remote::{ClickUpApi, MotionApi};
use tasklink_core::task::{ClickUpTask, MotionTask};
use tasklink_core::{Crosswalk, CursorStore, LinkStore, Pairing};

use crate::error::SyncError;
use crate::report::{ObjectFailure, ObjectOutcome, Operation, PairingReport};
use crate::transform::{to_creation_payload, to_update_payload, TransformPolicy};

/// Borrowed collaborators for one pass.
pub struct PairReconciler<'a> {
    pub pairing: &'a Pairing,
    pub clickup: &'a dyn ClickUpApi,
    pub motion: &'a dyn MotionApi,
    pub links: &'a dyn LinkStore,
    pub crosswalk: &'a Crosswalk,
    pub policy: &'a TransformPolicy,
}

impl<'a> PairReconciler<'a> {
    /// Reconcile everything changed after `since`. Does not touch the cursor.
    pub fn reconcile(&self, since: DateTime<Utc>, today: NaiveDate) -> Result<PairingReport, SyncError> {
        let pairing = self.pairing.id;
        let mut report = PairingReport::default();

        let changed_in_clickup = self
            .clickup
            .changed_tasks(&self.pairing.clickup_list_id, since)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|source| SyncError::Fetch {
                system: "clickup",
                source,
            })?;
        tracing::debug!(%pairing, count = changed_in_clickup.len(), "changed clickup tasks");

        let mut created_this_pass = HashSet::new();
        for task in &changed_in_clickup {
            match self.mirror_into_motion(task, today, &mut report) {
                Ok(outcome) => {
                    if let ObjectOutcome::Created { motion_task_id, .. } = &outcome {
                        created_this_pass.insert(motion_task_id.clone());
                    }
                    report.record(&outcome);
                }
                Err(failure) => {
                    tracing::warn!(
                        %pairing,
                        task = %failure.task_id,
                        operation = %failure.operation,
                        error = %failure.error,
                        "clickup task not mirrored",
                    );
                    report.record_failure(failure);
                }
            }
        }

        for item in self.motion.changed_tasks(&self.pairing.motion_workspace_id, since) {
            let task = item.map_err(|source| SyncError::Fetch {
                system: "motion",
                source,
            })?;
            if created_this_pass.contains(&task.id) {
                tracing::debug!(%pairing, task = %task.id, "skipping task created this pass");
                report.record(&ObjectOutcome::Echo);
                continue;
            }
            match self.push_back_to_clickup(&task) {
                Ok(outcome) => report.record(&outcome),
                Err(failure) => {
                    tracing::warn!(
                        %pairing,
                        task = %failure.task_id,
                        operation = %failure.operation,
                        error = %failure.error,
                        "motion task not pushed back",
                    );
                    report.record_failure(failure);
                }
            }
        }

        Ok(report)
    }

    fn mirror_into_motion(
        &self,
        task: &ClickUpTask,
        today: NaiveDate,
        report: &mut PairingReport,
    ) -> Result<ObjectOutcome, ObjectFailure> {
        let fail = |operation, error: String| ObjectFailure {
            task_id: task.id.clone(),
            operation,
            error,
        };

        let existing = self
            .links
            .find_by_clickup(&task.id)
            .map_err(|e| fail(Operation::LinkLookup, e.to_string()))?;
        if existing.is_some() {
            tracing::debug!(task = %task.id, "already linked");
            return Ok(ObjectOutcome::AlreadyLinked);
        }

        let draft = to_creation_payload(
            task,
            &self.pairing.motion_workspace_id,
            self.crosswalk,
            self.policy,
            today,
        );
        if !draft.unmapped_assignees.is_empty() {
            tracing::warn!(
                pairing = %self.pairing.id,
                task = %task.id,
                unmapped = ?draft.unmapped_assignees,
                "assignees without crosswalk entry dropped",
            );
            report.assignee_gaps += draft.unmapped_assignees.len();
        }

        let created = self
            .motion
            .create_task(&draft.payload)
            .map_err(|e| fail(Operation::CreateInMotion, e.to_string()))?;

        self.links.insert_link(&task.id, &created.id).map_err(|e| {
            // The Motion task exists but is unlinked; it will not be retried
            // or deduplicated automatically.
            tracing::error!(
                pairing = %self.pairing.id,
                clickup_task = %task.id,
                motion_task = %created.id,
                error = %e,
                "motion task created but link not recorded",
            );
            fail(Operation::LinkInsert, e.to_string())
        })?;

        tracing::info!(
            pairing = %self.pairing.id,
            clickup_task = %task.id,
            motion_task = %created.id,
            "mirrored into motion",
        );
        Ok(ObjectOutcome::Created {
            clickup_task_id: task.id.clone(),
            motion_task_id: created.id,
        })
    }

    fn push_back_to_clickup(&self, task: &MotionTask) -> Result<ObjectOutcome, ObjectFailure> {
        let fail = |operation, error: String| ObjectFailure {
            task_id: task.id.clone(),
            operation,
            error,
        };

        let Some(link) = self
            .links
            .find_by_motion(&task.id)
            .map_err(|e| fail(Operation::LinkLookup, e.to_string()))?
        else {
            tracing::debug!(task = %task.id, "unlinked motion task skipped");
            return Ok(ObjectOutcome::Unlinked);
        };

        // Tasks we created are stamped before their link row; until someone
        // edits them in Motion there is nothing to push back.
        if task.updated_at().is_some_and(|updated| updated <= link.created_at) {
            tracing::debug!(task = %task.id, linked_at = %link.created_at, "motion task untouched since link");
            return Ok(ObjectOutcome::UntouchedSinceLink);
        }

        let update = to_update_payload(task, self.policy);
        if update.is_empty() {
            return Ok(ObjectOutcome::NoChanges);
        }

        self.clickup
            .update_task(&link.clickup_task_id, &update)
            .map_err(|e| fail(Operation::UpdateInClickUp, e.to_string()))?;

        tracing::info!(
            pairing = %self.pairing.id,
            motion_task = %task.id,
            clickup_task = %link.clickup_task_id,
            "pushed back to clickup",
        );
        Ok(ObjectOutcome::Updated {
            motion_task_id: task.id.clone(),
            clickup_task_id: link.clickup_task_id,
        })
    }
}

/// Full pass for one pairing: read cursor, reconcile, commit cursor.
///
/// The cursor only advances when [`PairReconciler::reconcile`] returns `Ok`,
/// even if some objects failed inside it.
pub fn run_pairing<S>(
    store: &S,
    clickup: &dyn ClickUpApi,
    motion: &dyn MotionApi,
    crosswalk: &Crosswalk,
    policy: &TransformPolicy,
    pairing: &Pairing,
) -> Result<PairingReport, SyncError>
where
    S: LinkStore + CursorStore,
{
    let started = Utc::now();
    let since = store.get_cursor(pairing.id)?;
    tracing::info!(pairing = %pairing.id, name = %pairing.display_name(), %since, "pass started");

    let reconciler = PairReconciler {
        pairing,
        clickup,
        motion,
        links: store,
        crosswalk,
        policy,
    };
    let mut report = reconciler.reconcile(since, Local::now().date_naive())?;

    store.commit_cursor(pairing.id, started)?;
    report.cursor = Some(started);
    tracing::info!(
        pairing = %pairing.id,
        created = report.created,
        updated = report.updated,
        unchanged = report.unchanged,
        skipped = report.skipped,
        failures = report.failures.len(),
        "pass finished",
    );
    Ok(report)
}
