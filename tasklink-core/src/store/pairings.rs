//! `pairings` table and the per-pairing cursor.

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};

use super::{CursorStore, SqliteStore};
use crate::error::StoreError;
use crate::types::{Pairing, PairingId};

const PAIRING_SELECT_SQL: &str = "SELECT
    id,
    clickup_list_id,
    motion_workspace_id,
    label,
    last_sync_cursor,
    active
FROM pairings";

impl SqliteStore {
    /// Register a new active pairing.
    ///
    /// Duplicate (list, workspace) pairs are not rejected here; the CLI warns
    /// about them.
    pub fn add_pairing(
        &self,
        clickup_list_id: &str,
        motion_workspace_id: &str,
        label: Option<&str>,
    ) -> Result<Pairing, StoreError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO pairings (clickup_list_id, motion_workspace_id, label, active, created_at)
             VALUES (?1, ?2, ?3, 1, ?4)",
            params![clickup_list_id, motion_workspace_id, label, Utc::now()],
        )?;
        Ok(Pairing {
            id: PairingId(conn.last_insert_rowid()),
            clickup_list_id: clickup_list_id.to_string(),
            motion_workspace_id: motion_workspace_id.to_string(),
            label: label.map(str::to_string),
            last_sync_cursor: None,
            active: true,
        })
    }

    pub fn get_pairing(&self, id: PairingId) -> Result<Option<Pairing>, StoreError> {
        let conn = self.conn()?;
        let pairing = conn
            .query_row(
                &format!("{PAIRING_SELECT_SQL} WHERE id = ?1"),
                params![id.0],
                map_pairing,
            )
            .optional()?;
        Ok(pairing)
    }

    /// Every pairing, active or not, ordered by id.
    pub fn list_pairings(&self) -> Result<Vec<Pairing>, StoreError> {
        self.query_pairings(&format!("{PAIRING_SELECT_SQL} ORDER BY id"))
    }

    /// Pairings the orchestrator should run, ordered by id.
    pub fn active_pairings(&self) -> Result<Vec<Pairing>, StoreError> {
        self.query_pairings(&format!("{PAIRING_SELECT_SQL} WHERE active = 1 ORDER BY id"))
    }

    pub fn set_pairing_active(&self, id: PairingId, active: bool) -> Result<(), StoreError> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "UPDATE pairings SET active = ?1 WHERE id = ?2",
            params![active, id.0],
        )?;
        if changed == 0 {
            return Err(StoreError::PairingNotFound(id.0));
        }
        Ok(())
    }

    /// Forget the cursor so the next pass rescans from epoch.
    pub fn reset_cursor(&self, id: PairingId) -> Result<(), StoreError> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "UPDATE pairings SET last_sync_cursor = NULL WHERE id = ?1",
            params![id.0],
        )?;
        if changed == 0 {
            return Err(StoreError::PairingNotFound(id.0));
        }
        Ok(())
    }

    fn query_pairings(&self, sql: &str) -> Result<Vec<Pairing>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(sql)?;
        let pairings = stmt
            .query_map([], map_pairing)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(pairings)
    }
}

impl CursorStore for SqliteStore {
    fn get_cursor(&self, pairing: PairingId) -> Result<DateTime<Utc>, StoreError> {
        let conn = self.conn()?;
        let cursor: Option<Option<DateTime<Utc>>> = conn
            .query_row(
                "SELECT last_sync_cursor FROM pairings WHERE id = ?1",
                params![pairing.0],
                |row| row.get(0),
            )
            .optional()?;
        Ok(cursor.flatten().unwrap_or(DateTime::<Utc>::UNIX_EPOCH))
    }

    fn commit_cursor(&self, pairing: PairingId, at: DateTime<Utc>) -> Result<(), StoreError> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "UPDATE pairings SET last_sync_cursor = ?1 WHERE id = ?2",
            params![at, pairing.0],
        )?;
        if changed == 0 {
            return Err(StoreError::PairingNotFound(pairing.0));
        }
        tracing::debug!(pairing = %pairing, cursor = %at, "cursor committed");
        Ok(())
    }
}

fn map_pairing(row: &Row<'_>) -> rusqlite::Result<Pairing> {
    Ok(Pairing {
        id: PairingId(row.get(0)?),
        clickup_list_id: row.get(1)?,
        motion_workspace_id: row.get(2)?,
        label: row.get(3)?,
        last_sync_cursor: row.get(4)?,
        active: row.get(5)?,
    })
}
