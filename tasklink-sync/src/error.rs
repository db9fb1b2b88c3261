//! Error types for tasklink-sync.

use thiserror::Error;

use tasklink_core::{RemoteRequestError, StoreError};

/// Errors that abort a whole pairing pass or a whole run.
///
/// Per-object failures never surface here; they are recorded in the
/// pairing's [`PairingReport`](crate::PairingReport).
#[derive(Debug, Error)]
pub enum SyncError {
    /// Nothing to do or nothing to do it with; the run is not attempted.
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Listing changed tasks failed; no partial result set is reconciled.
    #[error("fetching changed {system} tasks failed: {source}")]
    Fetch {
        system: &'static str,
        #[source]
        source: RemoteRequestError,
    },

    #[error("pairing task join error: {0}")]
    Join(String),
}
