//! SQLite-backed persistence: pairings, links, cursors, identity crosswalk.
//!
//! # Tables
//!
//! ```text
//! pairings            id, clickup_list_id, motion_workspace_id, label,
//!                     last_sync_cursor, active, created_at
//! links               clickup_task_id UNIQUE, motion_task_id UNIQUE,
//!                     created_at, updated_at
//! identity_crosswalk  clickup_user_id PK, motion_user_id, label
//! ```
//!
//! # Invariants
//! - Link uniqueness is enforced by the UNIQUE constraints, never by
//!   application-level locking. A violating insert fails with
//!   [`StoreError::LinkConflict`] and changes nothing.
//! - A connection is only handed out after migrations succeeded.
//!
//! The reconciler sees the store through [`LinkStore`] and [`CursorStore`];
//! administrative operations are inherent methods on [`SqliteStore`].

use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use rusqlite::Connection;

use crate::error::{store_io_err, StoreError};
use crate::types::{Link, PairingId};

mod crosswalk;
mod links;
pub mod migrations;
mod pairings;

/// Correlation lookups and inserts used by the reconciler.
pub trait LinkStore: Send + Sync {
    fn find_by_clickup(&self, clickup_task_id: &str) -> Result<Option<Link>, StoreError>;

    fn find_by_motion(&self, motion_task_id: &str) -> Result<Option<Link>, StoreError>;

    /// Fails with [`StoreError::LinkConflict`] when either id is already linked.
    fn insert_link(&self, clickup_task_id: &str, motion_task_id: &str) -> Result<Link, StoreError>;

    /// Administrative escape hatch; returns whether a row was removed.
    fn delete_by_clickup(&self, clickup_task_id: &str) -> Result<bool, StoreError>;

    /// Administrative escape hatch; returns whether a row was removed.
    fn delete_by_motion(&self, motion_task_id: &str) -> Result<bool, StoreError>;
}

/// Per-pairing "last successful sync" timestamps.
pub trait CursorStore: Send + Sync {
    /// Epoch when the pairing has never been synced.
    fn get_cursor(&self, pairing: PairingId) -> Result<DateTime<Utc>, StoreError>;

    fn commit_cursor(&self, pairing: PairingId, at: DateTime<Utc>) -> Result<(), StoreError>;
}

/// A single SQLite connection shared by all concurrent pairings.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (creating if needed) the database file and apply migrations.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let started_at = Instant::now();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| store_io_err(parent, e))?;
        }

        let conn = Connection::open(path).and_then(|conn| {
            conn.busy_timeout(Duration::from_secs(5))?;
            Ok(conn)
        });
        let store = conn.map_err(StoreError::from).and_then(Self::bootstrap);
        match &store {
            Ok(_) => tracing::debug!(
                path = %path.display(),
                duration_ms = started_at.elapsed().as_millis() as u64,
                "store opened",
            ),
            Err(err) => tracing::error!(path = %path.display(), error = %err, "store open failed"),
        }
        store
    }

    /// In-memory database with migrations applied; used by tests.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::bootstrap(Connection::open_in_memory()?)
    }

    fn bootstrap(mut conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        migrations::apply_migrations(&mut conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn schema_version(&self) -> Result<u32, StoreError> {
        let conn = self.conn()?;
        migrations::current_user_version(&conn)
    }

    pub(crate) fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    err.sqlite_error_code() == Some(rusqlite::ErrorCode::ConstraintViolation)
}
