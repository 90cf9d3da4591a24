//! # Database Error Types
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)     Snapshot JSON (serde_json::Error)      │
//! │       │                                │                                │
//! │       └──────────────┬─────────────────┘                                │
//! │                      ▼                                                  │
//! │  DbError (this module)                                                  │
//! │       │                                                                 │
//! │       ├──► SessionState::restore  ── warn, start with an empty session │
//! │       └──► SessionState::mutate   ── warn, the in-memory change stands │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The store only ever upserts one row per terminal, so there is no
//! "not found" or "duplicate" case: a missing snapshot is `Ok(None)`.

use thiserror::Error;

/// Session store errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// The database file could not be opened or created.
    ///
    /// ## When This Occurs
    /// - Data directory not writable
    /// - Disk full
    /// - Pool closed during shutdown
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// SQLite refused a statement.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// A stored snapshot could not be encoded or decoded.
    ///
    /// ## When This Occurs
    /// - Row written by a build with a different `CartSession` shape
    /// - File edited by hand
    #[error("Snapshot serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The row was written by a newer build than this one.
    #[error("Snapshot version {found} is newer than supported version {supported}")]
    SnapshotVersion { found: i64, supported: i64 },

    /// All connections busy past the acquire timeout.
    #[error("Connection pool exhausted")]
    PoolExhausted,

    #[error("Internal database error: {0}")]
    Internal(String),
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::Database       → DbError::QueryFailed
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// sqlx::Error::PoolClosed     → DbError::ConnectionFailed
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => DbError::QueryFailed(db_err.message().to_string()),
            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,
            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),
            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;
