//! Scheduling and process wiring: tracing setup, engine construction from
//! config, one-shot runs and the periodic daemon loop.

mod error;
pub mod runtime;
pub mod scheduler;

pub use error::DaemonError;
pub use runtime::{build_engine, init_tracing, run_once, run_once_blocking, start_blocking};
pub use scheduler::{run_scheduler, SchedulerStats};
