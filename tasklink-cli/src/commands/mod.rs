pub mod crosswalk;
pub mod link;
pub mod pairing;
pub mod run;

use std::path::PathBuf;

use anyhow::{Context, Result};

use tasklink_core::{Config, SqliteStore};

pub(crate) fn home() -> Result<PathBuf> {
    dirs::home_dir().context("could not determine home directory")
}

/// Open the configured database. Administrative commands never need
/// credentials, so the config is loaded but not validated.
pub(crate) fn open_store() -> Result<SqliteStore> {
    let home = home()?;
    let config = Config::load_at(&home).context("failed to load ~/.tasklink/config.yaml")?;
    let path = config.database_path_at(&home);
    SqliteStore::open(&path).with_context(|| format!("failed to open database {}", path.display()))
}

pub(crate) fn format_time(at: Option<chrono::DateTime<chrono::Utc>>) -> String {
    match at {
        Some(at) => at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        None => "never".to_string(),
    }
}
