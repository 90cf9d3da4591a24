//! # Session Store Connection
//!
//! Opens the terminal's SQLite file and hands out repositories.
//!
//! ```text
//! DbConfig::new(<data dir>/stride.db)
//!      │
//!      ▼
//! Database::new(config).await
//!      ├── open/create file (WAL, synchronous=NORMAL)
//!      ├── SqlitePool (small: one terminal, one writer)
//!      └── run embedded migrations
//!      │
//!      ▼
//! db.sessions() ──► CartSessionRepository
//! ```
//!
//! WAL keeps the previous snapshot readable if the process dies mid-write.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::session::CartSessionRepository;

/// Where and how to open the session store.
///
/// ## Example
/// ```rust
/// use stride_db::DbConfig;
///
/// let config = DbConfig::new("/tmp/stride.db").max_connections(1);
/// assert_eq!(config.max_connections, 1);
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// SQLite file. `None` opens a private in-memory database.
    pub database_path: Option<PathBuf>,

    /// Pool size. A single terminal rarely needs more than one writer and
    /// one reader. Default: 2
    pub max_connections: u32,

    /// How long to wait for a free connection. Default: 5 seconds
    pub acquire_timeout: Duration,

    /// Apply embedded migrations when opening. Default: true
    pub run_migrations: bool,
}

impl DbConfig {
    /// Store backed by the file at `path`, created if missing.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: Some(path.into()),
            max_connections: 2,
            acquire_timeout: Duration::from_secs(5),
            run_migrations: true,
        }
    }

    /// Throwaway store for tests.
    ///
    /// Each SQLite connection to `:memory:` is its own database, so the
    /// pool is pinned to one connection.
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: None,
            max_connections: 1,
            acquire_timeout: Duration::from_secs(5),
            run_migrations: true,
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    fn connect_options(&self) -> SqliteConnectOptions {
        let options = match &self.database_path {
            Some(path) => SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal),
            None => SqliteConnectOptions::new().in_memory(true),
        };
        options.synchronous(SqliteSynchronous::Normal)
    }
}

/// Handle to the session store. Clones share the pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens the store and applies migrations unless disabled.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        match &config.database_path {
            Some(path) => info!(path = %path.display(), "Opening session store"),
            None => info!("Opening in-memory session store"),
        }

        let mut pool_options = SqlitePoolOptions::new()
            .max_connections(config.max_connections.max(1))
            .acquire_timeout(config.acquire_timeout);
        if config.database_path.is_none() {
            // Dropping the last connection would drop the database with it
            pool_options = pool_options
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }

        let pool = pool_options
            .connect_with(config.connect_options())
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;
        debug!(max_connections = config.max_connections, "Session store pool ready");

        let db = Database { pool };
        if config.run_migrations {
            migrations::run_migrations(&db.pool).await?;
        }
        Ok(db)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Repository for per-terminal session snapshots.
    pub fn sessions(&self) -> CartSessionRepository {
        CartSessionRepository::new(self.pool.clone())
    }

    /// Closes the pool. Repository calls fail afterwards.
    pub async fn close(&self) {
        info!("Closing session store");
        self.pool.close().await;
    }

    /// True when the store answers a trivial query.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
