//! `links` table: the ClickUp <-> Motion bijection.

use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};

use super::{is_unique_violation, LinkStore, SqliteStore};
use crate::error::StoreError;
use crate::types::Link;

const LINK_SELECT_SQL: &str =
    "SELECT clickup_task_id, motion_task_id, created_at, updated_at FROM links";

impl LinkStore for SqliteStore {
    fn find_by_clickup(&self, clickup_task_id: &str) -> Result<Option<Link>, StoreError> {
        let conn = self.conn()?;
        let link = conn
            .query_row(
                &format!("{LINK_SELECT_SQL} WHERE clickup_task_id = ?1"),
                params![clickup_task_id],
                map_link,
            )
            .optional()?;
        Ok(link)
    }

    fn find_by_motion(&self, motion_task_id: &str) -> Result<Option<Link>, StoreError> {
        let conn = self.conn()?;
        let link = conn
            .query_row(
                &format!("{LINK_SELECT_SQL} WHERE motion_task_id = ?1"),
                params![motion_task_id],
                map_link,
            )
            .optional()?;
        Ok(link)
    }

    fn insert_link(&self, clickup_task_id: &str, motion_task_id: &str) -> Result<Link, StoreError> {
        let now = Utc::now();
        let conn = self.conn()?;
        match conn.execute(
            "INSERT INTO links (clickup_task_id, motion_task_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?3)",
            params![clickup_task_id, motion_task_id, now],
        ) {
            Ok(_) => Ok(Link {
                clickup_task_id: clickup_task_id.to_string(),
                motion_task_id: motion_task_id.to_string(),
                created_at: now,
                updated_at: now,
            }),
            Err(err) if is_unique_violation(&err) => Err(StoreError::LinkConflict {
                clickup_task_id: clickup_task_id.to_string(),
                motion_task_id: motion_task_id.to_string(),
            }),
            Err(err) => Err(err.into()),
        }
    }

    fn delete_by_clickup(&self, clickup_task_id: &str) -> Result<bool, StoreError> {
        let conn = self.conn()?;
        let removed = conn.execute(
            "DELETE FROM links WHERE clickup_task_id = ?1",
            params![clickup_task_id],
        )?;
        Ok(removed > 0)
    }

    fn delete_by_motion(&self, motion_task_id: &str) -> Result<bool, StoreError> {
        let conn = self.conn()?;
        let removed = conn.execute(
            "DELETE FROM links WHERE motion_task_id = ?1",
            params![motion_task_id],
        )?;
        Ok(removed > 0)
    }
}

impl SqliteStore {
    /// All links, oldest first.
    pub fn list_links(&self) -> Result<Vec<Link>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!("{LINK_SELECT_SQL} ORDER BY created_at, rowid"))?;
        let links = stmt
            .query_map([], map_link)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(links)
    }
}

fn map_link(row: &Row<'_>) -> rusqlite::Result<Link> {
    Ok(Link {
        clickup_task_id: row.get(0)?,
        motion_task_id: row.get(1)?,
        created_at: row.get(2)?,
        updated_at: row.get(3)?,
    })
}
