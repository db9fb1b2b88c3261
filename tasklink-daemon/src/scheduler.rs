//! Fixed-interval job loop with overlap protection.
//!
//! A tick that arrives while the previous run is still in flight is
//! skipped, never queued. On shutdown the in-flight run is awaited so its
//! cursors get committed.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::error::DaemonError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    pub started: usize,
    pub skipped: usize,
}

/// Call `job` every `period` until `shutdown` resolves.
///
/// The first run starts immediately.
pub async fn run_scheduler<J, Fut, S>(
    mut job: J,
    period: Duration,
    shutdown: S,
) -> Result<SchedulerStats, DaemonError>
where
    J: FnMut() -> Fut,
    Fut: Future<Output = ()> + Send + 'static,
    S: Future<Output = ()>,
{
    if period.is_zero() {
        return Err(DaemonError::InvalidInterval(0));
    }

    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut stats = SchedulerStats::default();
    let mut in_flight: Option<JoinHandle<()>> = None;
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = ticker.tick() => {
                if in_flight.as_ref().is_some_and(|handle| !handle.is_finished()) {
                    tracing::warn!("previous sync run still in flight, tick skipped");
                    stats.skipped += 1;
                    continue;
                }
                if let Some(handle) = in_flight.take() {
                    log_join(handle.await);
                }
                in_flight = Some(tokio::spawn(job()));
                stats.started += 1;
            }
        }
    }

    if let Some(handle) = in_flight.take() {
        tracing::info!("waiting for in-flight sync run before exiting");
        log_join(handle.await);
    }
    tracing::info!(started = stats.started, skipped = stats.skipped, "scheduler stopped");
    Ok(stats)
}

fn log_join(result: Result<(), tokio::task::JoinError>) {
    if let Err(err) = result {
        tracing::error!(error = %err, "sync run task join failure");
    }
}
