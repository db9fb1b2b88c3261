//! Schema upgrades, tracked in `PRAGMA user_version`.
//!
//! Each step is one SQL file numbered from 1. Opening a database runs every
//! step above its stored version inside one transaction, so a failed upgrade
//! leaves the file at its previous version. Files written by a newer tasklink
//! are refused rather than guessed at.

use rusqlite::{Connection, TransactionBehavior};

use crate::error::StoreError;

/// `(version, sql)`, ascending.
const STEPS: [(u32, &str); 1] = [(1, include_str!("0001_init.sql"))];

/// Schema version this build writes.
pub fn latest_version() -> u32 {
    STEPS.iter().map(|(version, _)| *version).max().unwrap_or(0)
}

/// Bring `conn` up to [`latest_version`].
pub fn apply_migrations(conn: &mut Connection) -> Result<(), StoreError> {
    let on_disk = current_user_version(conn)?;
    let target = latest_version();
    if on_disk > target {
        return Err(StoreError::UnsupportedSchemaVersion {
            db_version: on_disk,
            latest_supported: target,
        });
    }

    let pending: Vec<_> = STEPS.iter().filter(|(version, _)| *version > on_disk).collect();
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    for (version, sql) in pending {
        tracing::debug!(from = on_disk, to = version, "upgrading tasklink schema");
        tx.execute_batch(sql)?;
        tx.pragma_update(None, "user_version", version)?;
    }
    tx.commit()?;
    Ok(())
}

pub fn current_user_version(conn: &Connection) -> Result<u32, StoreError> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upgrade_is_idempotent() {
        let mut conn = Connection::open_in_memory().unwrap();
        assert_eq!(current_user_version(&conn).unwrap(), 0);

        apply_migrations(&mut conn).unwrap();
        apply_migrations(&mut conn).unwrap();

        assert_eq!(current_user_version(&conn).unwrap(), latest_version());
        let links: i64 = conn
            .query_row("SELECT COUNT(*) FROM links", [], |row| row.get(0))
            .unwrap();
        assert_eq!(links, 0);
    }
}
