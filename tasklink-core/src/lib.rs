//! tasklink core library — domain types, persistence, configuration, errors.
//!
//! Public API surface:
//! - [`types`] — newtypes, pairings, links and the identity crosswalk
//! - [`task`] — wire shapes of ClickUp and Motion tasks and their payloads
//! - [`patch`] — [`FieldUpdate`], the keep / clear / set tri-state
//! - [`remote`] — traits implemented by the HTTP clients
//! - [`paging`] — lazy page-by-page iteration over remote collections
//! - [`store`] — SQLite-backed pairings, links, cursors and crosswalk
//! - [`config`] — `~/.tasklink/config.yaml` loading and validation
//! - [`error`] — [`StoreError`], [`ConfigError`], [`RemoteRequestError`]

pub mod config;
pub mod error;
pub mod paging;
pub mod patch;
pub mod remote;
pub mod store;
pub mod task;
pub mod types;

pub use config::Config;
pub use error::{ConfigError, RemoteRequestError, StoreError};
pub use paging::{Page, Pages};
pub use patch::FieldUpdate;
pub use remote::{ClickUpApi, MotionApi, TaskStream};
pub use store::{CursorStore, LinkStore, SqliteStore};
pub use types::{Crosswalk, CrosswalkEntry, Link, Pairing, PairingId};
