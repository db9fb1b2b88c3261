//! # tasklink-sync
//!
//! Incremental ClickUp <-> Motion reconciliation.
//!
//! - [`transform`] — pure field mapping in each direction
//! - [`reconciler`] — one pass over one pairing, plus cursor handling
//! - [`orchestrator`] — fans passes out across all active pairings
//! - [`report`] — per-object outcomes, per-pairing reports, run summary
//!
//! Call [`Engine::run`] for a full run.

pub mod error;
pub mod orchestrator;
pub mod reconciler;
pub mod report;
pub mod transform;

pub use error::SyncError;
pub use orchestrator::Engine;
pub use reconciler::{run_pairing, PairReconciler};
pub use report::{
    ObjectFailure, ObjectOutcome, Operation, PairingReport, PairingResult, PairingStatus, RunSummary,
};
pub use transform::{to_creation_payload, to_update_payload, CreationDraft, TransformPolicy};
