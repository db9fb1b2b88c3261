use std::path::PathBuf;

use thiserror::Error;

/// Error surface for engine wiring and the daemon loop.
#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config error: {0}")]
    Config(#[from] tasklink_core::ConfigError),

    #[error("store error: {0}")]
    Store(#[from] tasklink_core::StoreError),

    #[error("sync error: {0}")]
    Sync(#[from] tasklink_sync::SyncError),

    #[error("invalid sync interval: {0} seconds")]
    InvalidInterval(u64),
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> DaemonError {
    DaemonError::Io {
        path: path.into(),
        source,
    }
}
