//! Fan a run out across all active pairings.
//!
//! Each pairing gets its own `spawn_blocking` task (the remote clients and
//! the store are synchronous). A pairing that errors or panics is recorded as
//! failed; the others are unaffected.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tokio::task::JoinHandle;

use tasklink_core::remote::{ClickUpApi, MotionApi};
use tasklink_core::{Crosswalk, Pairing, SqliteStore};

use crate::error::SyncError;
use crate::reconciler::run_pairing;
use crate::report::{PairingReport, RunSummary};
use crate::transform::TransformPolicy;

/// Everything a run needs, shareable across pairing tasks.
#[derive(Clone)]
pub struct Engine {
    store: Arc<SqliteStore>,
    clickup: Arc<dyn ClickUpApi>,
    motion: Arc<dyn MotionApi>,
    policy: Arc<TransformPolicy>,
}

impl Engine {
    pub fn new(
        store: Arc<SqliteStore>,
        clickup: Arc<dyn ClickUpApi>,
        motion: Arc<dyn MotionApi>,
        policy: TransformPolicy,
    ) -> Self {
        Self {
            store,
            clickup,
            motion,
            policy: Arc::new(policy),
        }
    }

    pub fn store(&self) -> &Arc<SqliteStore> {
        &self.store
    }

    /// Run one pass over every active pairing concurrently.
    ///
    /// Fails only when nothing can be attempted: no active pairings, or the
    /// pairings and crosswalk cannot be loaded.
    pub async fn run(&self) -> Result<RunSummary, SyncError> {
        let started = Instant::now();
        let mut summary = RunSummary::new(Utc::now());

        let store = self.store.clone();
        let (pairings, crosswalk) = handle_join(
            tokio::task::spawn_blocking(move || -> Result<_, SyncError> {
                Ok((store.active_pairings()?, store.load_crosswalk()?))
            })
            .await,
        )??;

        if pairings.is_empty() {
            return Err(SyncError::Configuration("no active pairings".to_string()));
        }
        tracing::info!(pairings = pairings.len(), crosswalk = crosswalk.len(), "sync run started");

        let crosswalk = Arc::new(crosswalk);
        let handles: Vec<(Pairing, JoinHandle<Result<PairingReport, SyncError>>)> = pairings
            .into_iter()
            .map(|pairing| {
                let handle = self.spawn_pairing(pairing.clone(), crosswalk.clone());
                (pairing, handle)
            })
            .collect();

        for (pairing, handle) in handles {
            match handle_join(handle.await) {
                Ok(Ok(report)) => summary.record_success(&pairing, report),
                Ok(Err(err)) | Err(err) => {
                    tracing::error!(pairing = %pairing.id, name = %pairing.display_name(), error = %err, "pairing failed");
                    summary.record_failure(&pairing, err);
                }
            }
        }

        summary.finish(started.elapsed());
        tracing::info!(
            created = summary.created(),
            updated = summary.updated(),
            object_failures = summary.object_failures(),
            failed_pairings = summary.failed_pairings(),
            duration_ms = summary.duration_ms,
            "sync run finished",
        );
        Ok(summary)
    }

    fn spawn_pairing(
        &self,
        pairing: Pairing,
        crosswalk: Arc<Crosswalk>,
    ) -> JoinHandle<Result<PairingReport, SyncError>> {
        let engine = self.clone();
        tokio::task::spawn_blocking(move || {
            run_pairing(
                engine.store.as_ref(),
                engine.clickup.as_ref(),
                engine.motion.as_ref(),
                &crosswalk,
                &engine.policy,
                &pairing,
            )
        })
    }
}

/// Flatten a join result; a panicked or cancelled task becomes an error.
fn handle_join<T>(result: Result<T, tokio::task::JoinError>) -> Result<T, SyncError> {
    result.map_err(|e| SyncError::Join(e.to_string()))
}
