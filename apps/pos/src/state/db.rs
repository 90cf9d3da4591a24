//! # Database State
//!
//! Wraps the `Database` connection for use in commands.
//!
//! ## Thread Safety
//! The `Database` struct from `stride-db` contains a `SqlitePool` which
//! is inherently thread-safe. The session store clones it freely.

use stride_db::{Database, DbConfig, DbResult};

/// Wrapper around `Database` for app state.
#[derive(Debug, Clone)]
pub struct DbState {
    db: Database,
}

impl DbState {
    /// Creates a new DbState wrapping the database connection.
    pub fn new(db: Database) -> Self {
        DbState { db }
    }

    /// Opens (and migrates) the database at `config`.
    pub async fn open(config: DbConfig) -> DbResult<Self> {
        Ok(DbState::new(Database::new(config).await?))
    }

    /// Returns a reference to the inner Database.
    pub fn inner(&self) -> &Database {
        &self.db
    }
}
