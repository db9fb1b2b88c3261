//! `~/.tasklink/config.yaml` loading and credential validation.
//!
//! # Layout
//!
//! ```text
//! ~/.tasklink/
//!   config.yaml      (optional — every field has a default)
//!   tasklink.db      (default database location)
//! ```
//!
//! Environment variables override the file: `TASKLINK_CLICKUP_TOKEN`,
//! `TASKLINK_MOTION_API_KEY`, `TASKLINK_DATABASE`.
//!
//! Like the store, every function taking a home directory has an `_at` form
//! used by tests and a convenience form that resolves `dirs::home_dir()`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const ENV_CLICKUP_TOKEN: &str = "TASKLINK_CLICKUP_TOKEN";
pub const ENV_MOTION_API_KEY: &str = "TASKLINK_MOTION_API_KEY";
pub const ENV_DATABASE: &str = "TASKLINK_DATABASE";

pub const DEFAULT_CLICKUP_BASE_URL: &str = "https://api.clickup.com/api/v2";
pub const DEFAULT_MOTION_BASE_URL: &str = "https://api.usemotion.com/v1";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// SQLite file; relative paths resolve against `~/.tasklink/`.
    pub database: Option<PathBuf>,
    pub clickup: ClickUpConfig,
    pub motion: MotionConfig,
    pub sync: SyncConfig,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClickUpConfig {
    pub api_token: Option<String>,
    pub base_url: String,
}

impl Default for ClickUpConfig {
    fn default() -> Self {
        Self {
            api_token: None,
            base_url: DEFAULT_CLICKUP_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    pub api_key: Option<String>,
    pub base_url: String,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_MOTION_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// ClickUp status applied when the Motion task is completed.
    pub done_status: String,
    /// Seconds between scheduled runs in daemon mode.
    pub interval_secs: u64,
    pub auto_schedule: AutoScheduleConfig,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            done_status: "complete".to_string(),
            interval_secs: 900,
            auto_schedule: AutoScheduleConfig::default(),
        }
    }
}

/// Auto-scheduling block attached to Motion task creations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoScheduleConfig {
    pub enabled: bool,
    /// Motion schedule (work-hours calendar) name.
    pub schedule: String,
}

impl Default for AutoScheduleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            schedule: "Work Hours".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

// ---------------------------------------------------------------------------
// Paths
// ---------------------------------------------------------------------------

/// `<home>/.tasklink`
pub fn tasklink_root(home: &Path) -> PathBuf {
    home.join(".tasklink")
}

/// `<home>/.tasklink/config.yaml`
pub fn config_path_at(home: &Path) -> PathBuf {
    tasklink_root(home).join("config.yaml")
}

fn home() -> Result<PathBuf, ConfigError> {
    dirs::home_dir().ok_or(ConfigError::HomeNotFound)
}

// ---------------------------------------------------------------------------
// Load
// ---------------------------------------------------------------------------

impl Config {
    /// Load `<home>/.tasklink/config.yaml` (defaults when absent) and apply
    /// environment overrides. Credentials are not checked; see [`Config::validate`].
    pub fn load_at(home: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load_file_at(home)?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// `load_at` convenience wrapper.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_at(&home()?)
    }

    /// File contents only, without environment overrides.
    pub fn load_file_at(home: &Path) -> Result<Self, ConfigError> {
        let path = config_path_at(home);
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse { path, source })
    }

    /// Overlay environment values. `lookup` is injectable for tests.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(token) = lookup(ENV_CLICKUP_TOKEN).filter(|v| !v.trim().is_empty()) {
            self.clickup.api_token = Some(token);
        }
        if let Some(key) = lookup(ENV_MOTION_API_KEY).filter(|v| !v.trim().is_empty()) {
            self.motion.api_key = Some(key);
        }
        if let Some(db) = lookup(ENV_DATABASE).filter(|v| !v.trim().is_empty()) {
            self.database = Some(PathBuf::from(db));
        }
    }

    /// Resolved database path for this home directory.
    pub fn database_path_at(&self, home: &Path) -> PathBuf {
        match &self.database {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => tasklink_root(home).join(path),
            None => tasklink_root(home).join("tasklink.db"),
        }
    }

    /// Fail when either credential is missing or still a template value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_credential("clickup.api_token", self.clickup.api_token.as_deref())?;
        check_credential("motion.api_key", self.motion.api_key.as_deref())?;
        Ok(())
    }

    /// ClickUp token after [`Config::validate`] succeeded.
    pub fn clickup_token(&self) -> Result<&str, ConfigError> {
        check_credential("clickup.api_token", self.clickup.api_token.as_deref())
    }

    /// Motion API key after [`Config::validate`] succeeded.
    pub fn motion_api_key(&self) -> Result<&str, ConfigError> {
        check_credential("motion.api_key", self.motion.api_key.as_deref())
    }
}

fn check_credential<'a>(name: &'static str, value: Option<&'a str>) -> Result<&'a str, ConfigError> {
    let value = value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::MissingCredential(name))?;
    if is_placeholder(value) {
        return Err(ConfigError::PlaceholderCredential(name));
    }
    Ok(value)
}

fn is_placeholder(value: &str) -> bool {
    let lower = value.to_ascii_lowercase();
    lower == "changeme"
        || lower == "todo"
        || lower.starts_with("your-")
        || lower.starts_with("your_")
        || (lower.starts_with('<') && lower.ends_with('>'))
        || (lower.len() >= 3 && lower.chars().all(|c| c == 'x'))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
