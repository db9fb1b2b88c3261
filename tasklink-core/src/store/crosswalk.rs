//! `identity_crosswalk` table.

use rusqlite::{params, Row};

use super::SqliteStore;
use crate::error::StoreError;
use crate::types::{Crosswalk, CrosswalkEntry};

impl SqliteStore {
    /// Insert or replace the mapping for `entry.clickup_user_id`.
    pub fn upsert_crosswalk_entry(&self, entry: &CrosswalkEntry) -> Result<(), StoreError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO identity_crosswalk (clickup_user_id, motion_user_id, label)
             VALUES (?1, ?2, ?3)
             ON CONFLICT (clickup_user_id) DO UPDATE SET
                motion_user_id = excluded.motion_user_id,
                label = excluded.label",
            params![entry.clickup_user_id, entry.motion_user_id, entry.label],
        )?;
        Ok(())
    }

    pub fn delete_crosswalk_entry(&self, clickup_user_id: &str) -> Result<bool, StoreError> {
        let conn = self.conn()?;
        let removed = conn.execute(
            "DELETE FROM identity_crosswalk WHERE clickup_user_id = ?1",
            params![clickup_user_id],
        )?;
        Ok(removed > 0)
    }

    pub fn list_crosswalk(&self) -> Result<Vec<CrosswalkEntry>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT clickup_user_id, motion_user_id, label
             FROM identity_crosswalk ORDER BY clickup_user_id",
        )?;
        let entries = stmt
            .query_map([], map_entry)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    /// Full crosswalk as an in-memory lookup.
    pub fn load_crosswalk(&self) -> Result<Crosswalk, StoreError> {
        Ok(self.list_crosswalk()?.into_iter().collect())
    }
}

fn map_entry(row: &Row<'_>) -> rusqlite::Result<CrosswalkEntry> {
    Ok(CrosswalkEntry {
        clickup_user_id: row.get(0)?,
        motion_user_id: row.get(1)?,
        label: row.get(2)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(clickup: &str, motion: &str) -> CrosswalkEntry {
        CrosswalkEntry {
            clickup_user_id: clickup.to_string(),
            motion_user_id: motion.to_string(),
            label: None,
        }
    }

    #[test]
    fn upsert_replaces_existing_mapping() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.upsert_crosswalk_entry(&entry("81", "mu_old")).unwrap();
        store.upsert_crosswalk_entry(&entry("81", "mu_new")).unwrap();
        store.upsert_crosswalk_entry(&entry("82", "mu_2")).unwrap();

        let crosswalk = store.load_crosswalk().unwrap();
        assert_eq!(crosswalk.len(), 2);
        assert_eq!(crosswalk.resolve("81"), Some("mu_new"));
    }

    #[test]
    fn delete_entry() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.upsert_crosswalk_entry(&entry("81", "mu_1")).unwrap();
        assert!(store.delete_crosswalk_entry("81").unwrap());
        assert!(store.list_crosswalk().unwrap().is_empty());
    }
}
