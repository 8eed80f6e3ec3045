//! Async per-session command handles.

/// Handle type and session worker loop.
pub mod handle;

pub use handle::{RuntimeError, SessionHandle, spawn_session};
