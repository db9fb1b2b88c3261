//! Wiring from `~/.tasklink/config.yaml` to a running engine.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tasklink_core::config::LogFormat;
use tasklink_core::{Config, SqliteStore};
use tasklink_remote::{ClickUpClient, MotionClient};
use tasklink_sync::{Engine, RunSummary, TransformPolicy};

use crate::error::{io_err, DaemonError};
use crate::scheduler::run_scheduler;

/// Install the global subscriber. `RUST_LOG` overrides the `info` default.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_tracing(format: LogFormat) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt().with_env_filter(filter).with_target(false).with_writer(std::io::stderr);
    let _ = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}

/// Validate credentials, open the store and construct both clients.
pub fn build_engine(config: &Config, home: &Path) -> Result<Engine, DaemonError> {
    config.validate()?;
    let store = SqliteStore::open(config.database_path_at(home))?;
    let clickup = ClickUpClient::from_config(config)?;
    let motion = MotionClient::from_config(config)?;
    Ok(Engine::new(
        Arc::new(store),
        Arc::new(clickup),
        Arc::new(motion),
        TransformPolicy::from_config(&config.sync),
    ))
}

/// One full run across all active pairings.
pub async fn run_once(engine: &Engine) -> Result<RunSummary, DaemonError> {
    Ok(engine.run().await?)
}

/// [`run_once`] on a fresh runtime, for synchronous callers such as the CLI.
pub fn run_once_blocking(config: &Config, home: &Path) -> Result<RunSummary, DaemonError> {
    let engine = build_engine(config, home)?;
    let runtime = new_runtime()?;
    runtime.block_on(run_once(&engine))
}

/// Start the periodic daemon and block until ctrl-c.
pub fn start_blocking(config: &Config, home: &Path) -> Result<(), DaemonError> {
    let interval = config.sync.interval_secs;
    if interval == 0 {
        return Err(DaemonError::InvalidInterval(interval));
    }
    let engine = build_engine(config, home)?;
    tracing::info!(interval_secs = interval, "tasklink daemon starting");

    let runtime = new_runtime()?;
    runtime.block_on(async move {
        let job = move || {
            let engine = engine.clone();
            async move { log_run(engine.run().await) }
        };
        run_scheduler(job, Duration::from_secs(interval), ctrl_c()).await
    })?;
    Ok(())
}

fn new_runtime() -> Result<tokio::runtime::Runtime, DaemonError> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| io_err("tokio-runtime", e))
}

async fn ctrl_c() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("received ctrl-c, shutting down daemon"),
        Err(err) => {
            tracing::error!(error = %err, "ctrl-c handler failed; running until killed");
            std::future::pending::<()>().await;
        }
    }
}

fn log_run(result: Result<RunSummary, tasklink_sync::SyncError>) {
    match result {
        Ok(summary) if summary.has_failures() => tracing::warn!(
            failed_pairings = summary.failed_pairings(),
            object_failures = summary.object_failures(),
            "sync run finished with failures",
        ),
        Ok(_) => {}
        Err(err) => tracing::error!(error = %err, "sync run not attempted"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn configured() -> Config {
        let mut config = Config::default();
        config.clickup.api_token = Some("pk_test_token".to_string());
        config.motion.api_key = Some("mk_test_key".to_string());
        config
    }

    #[test]
    fn build_engine_rejects_missing_credentials() {
        let home = TempDir::new().unwrap();
        let result = build_engine(&Config::default(), home.path());
        assert!(matches!(result, Err(DaemonError::Config(_))));
        assert!(!tasklink_core::config::tasklink_root(home.path()).join("tasklink.db").exists());
    }

    #[test]
    fn build_engine_creates_database_under_home() {
        let home = TempDir::new().unwrap();
        let engine = build_engine(&configured(), home.path()).unwrap();
        assert!(configured().database_path_at(home.path()).exists());
        assert!(engine.store().list_pairings().unwrap().is_empty());
    }

    #[test]
    fn run_without_pairings_is_a_sync_configuration_error() {
        let home = TempDir::new().unwrap();
        let result = run_once_blocking(&configured(), home.path());
        assert!(matches!(
            result,
            Err(DaemonError::Sync(tasklink_sync::SyncError::Configuration(_)))
        ));
    }

    #[test]
    fn zero_interval_is_rejected_before_anything_starts() {
        let home = TempDir::new().unwrap();
        let mut config = configured();
        config.sync.interval_secs = 0;
        assert!(matches!(
            start_blocking(&config, home.path()),
            Err(DaemonError::InvalidInterval(0))
        ));
    }
}
