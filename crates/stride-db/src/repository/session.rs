//! # Cart Session Repository
//!
//! One JSON snapshot of the [`CartSession`] per terminal.
//!
//! ```text
//! save("counter-1", &session)
//!      │  serde_json::to_string
//!      ▼
//! INSERT ... ON CONFLICT(terminal_id) DO UPDATE   ← whole snapshot replaced
//!
//! load("counter-1")
//!      │  SELECT payload
//!      ▼
//! serde_json::from_str ──► Some(CartSession) | None (no row)
//!                     ├──► Err(Serialization) (unreadable row)
//!                     └──► Err(SnapshotVersion) (written by a newer build)
//! ```
//!
//! The snapshot is written after every successful mutation, so a row never
//! reflects a half-applied change.

use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use stride_core::CartSession;

/// Payload schema written by this build.
pub const SNAPSHOT_VERSION: i64 = 1;

/// A stored snapshot with its metadata.
#[derive(Debug, Clone)]
pub struct SessionRecord {
    pub terminal_id: String,
    pub session: CartSession,
    pub version: i64,
    pub updated_at: DateTime<Utc>,
}

/// Repository for per-terminal cart session snapshots.
#[derive(Debug, Clone)]
pub struct CartSessionRepository {
    pool: SqlitePool,
}

impl CartSessionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CartSessionRepository { pool }
    }

    /// Upserts the snapshot for `terminal_id`.
    pub async fn save(&self, terminal_id: &str, session: &CartSession) -> DbResult<()> {
        let payload = serde_json::to_string(session)?;
        let now = Utc::now();

        debug!(
            terminal_id = %terminal_id,
            bytes = payload.len(),
            "Saving cart session snapshot"
        );

        sqlx::query(
            r#"
            INSERT INTO cart_sessions (terminal_id, payload, version, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(terminal_id) DO UPDATE SET
                payload = excluded.payload,
                version = excluded.version,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(terminal_id)
        .bind(&payload)
        .bind(SNAPSHOT_VERSION)
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Loads the snapshot for `terminal_id`. `None` when nothing was saved.
    pub async fn load(&self, terminal_id: &str) -> DbResult<Option<CartSession>> {
        Ok(self.load_record(terminal_id).await?.map(|r| r.session))
    }

    /// Loads the snapshot together with its metadata.
    pub async fn load_record(&self, terminal_id: &str) -> DbResult<Option<SessionRecord>> {
        let row = sqlx::query(
            r#"
            SELECT terminal_id, payload, version, updated_at
            FROM cart_sessions
            WHERE terminal_id = ?1
            "#,
        )
        .bind(terminal_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            debug!(terminal_id = %terminal_id, "No stored cart session");
            return Ok(None);
        };

        let version: i64 = row.try_get("version")?;
        if version > SNAPSHOT_VERSION {
            return Err(DbError::SnapshotVersion {
                found: version,
                supported: SNAPSHOT_VERSION,
            });
        }

        let payload: String = row.try_get("payload")?;
        let session: CartSession = serde_json::from_str(&payload)?;
        let updated_at: String = row.try_get("updated_at")?;
        // A malformed timestamp does not make the snapshot unusable
        let updated_at = DateTime::parse_from_rfc3339(&updated_at)
            .map(|t| t.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now());

        Ok(Some(SessionRecord {
            terminal_id: row.try_get("terminal_id")?,
            session,
            version,
            updated_at,
        }))
    }

    /// Deletes the snapshot. Returns whether a row existed.
    pub async fn delete(&self, terminal_id: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM cart_sessions WHERE terminal_id = ?1")
            .bind(terminal_id)
            .execute(&self.pool)
            .await?;

        debug!(terminal_id = %terminal_id, "Deleted cart session snapshot");
        Ok(result.rows_affected() > 0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
