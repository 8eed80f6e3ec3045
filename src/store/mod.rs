//! Persistent store: SQLite schema, connection setup, and error taxonomy.

/// SQLite connection wrapper and per-statement query helpers.
pub mod sqlite;

use rusqlite::ErrorCode;
use thiserror::Error;

/// Error produced by store access.
///
/// Serialization conflicts (busy/locked) are a distinct, retryable class;
/// everything else is a hard fault that surfaces as the owning operation's
/// generic failure outcome.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying SQLite failure.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// Key derivation failed while hashing a credential.
    #[error("key derivation failed: {0}")]
    Kdf(String),
    /// A serializable transaction kept hitting conflicts past the budget.
    #[error("conflict retry budget exhausted after {0} attempts")]
    RetriesExhausted(u32),
    /// A row the schema should guarantee was missing.
    #[error("inconsistent store state: {0}")]
    Corrupt(String),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// True when `err` is the store's serialization-conflict class: another
/// writer holds the database and the whole transaction should be re-run.
pub(crate) fn is_sqlite_conflict(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(inner, _)
            if inner.code == ErrorCode::DatabaseBusy || inner.code == ErrorCode::DatabaseLocked
    )
}

impl StoreError {
    /// True when the error is a retryable serialization conflict.
    pub fn is_conflict(&self) -> bool {
        match self {
            StoreError::Sqlite(err) => is_sqlite_conflict(err),
            _ => false,
        }
    }
}
