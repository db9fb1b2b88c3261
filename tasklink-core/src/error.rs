//! Error types for tasklink-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from the SQLite store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying SQLite failure.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// The database was written by a newer binary.
    #[error("database schema version {db_version} is newer than supported {latest_supported}")]
    UnsupportedSchemaVersion { db_version: u32, latest_supported: u32 },

    /// Either side of the pair already has a link.
    #[error("link conflict: clickup task {clickup_task_id} / motion task {motion_task_id} already linked")]
    LinkConflict {
        clickup_task_id: String,
        motion_task_id: String,
    },

    /// No pairing row with this id.
    #[error("pairing {0} not found")]
    PairingNotFound(i64),

    /// A thread panicked while holding the connection lock.
    #[error("store connection lock poisoned")]
    Poisoned,

    /// The database directory could not be created.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from loading or validating `config.yaml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error, with the offending file.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("missing credential: {0} (set it in config.yaml or the environment)")]
    MissingCredential(&'static str),

    #[error("credential {0} still holds a placeholder value")]
    PlaceholderCredential(&'static str),

    /// `dirs::home_dir()` returned `None`.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,
}

/// A failed call against ClickUp or Motion.
///
/// `status` is `None` when the request never produced an HTTP response
/// (DNS, TLS, connection reset, undecodable body).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{operation} failed ({}): {body}", status.map(|s| s.to_string()).unwrap_or_else(|| "transport".to_string()))]
pub struct RemoteRequestError {
    pub operation: String,
    pub status: Option<u16>,
    pub body: String,
}

impl RemoteRequestError {
    pub fn status(operation: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            status: Some(status),
            body: body.into(),
        }
    }

    pub fn transport(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            status: None,
            body: message.into(),
        }
    }
}

/// Convenience constructor for [`StoreError::Io`].
pub(crate) fn store_io_err(path: impl Into<PathBuf>, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.into(),
        source,
    }
}
