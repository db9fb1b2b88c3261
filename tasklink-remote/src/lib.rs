//! # tasklink-remote
//!
//! Thin blocking HTTP clients for ClickUp and Motion.
//!
//! Each client implements the matching trait from `tasklink_core::remote`,
//! adds the system's auth header, and turns non-2xx responses into
//! [`RemoteRequestError`](tasklink_core::RemoteRequestError). Nothing here
//! retries; failure isolation is the reconciler's job.

pub mod clickup;
mod http;
pub mod motion;

pub use clickup::ClickUpClient;
pub use motion::MotionClient;
