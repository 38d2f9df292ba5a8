//! Periodic full-state snapshot persistence.
//!
//! Snapshots make recovery cheap: startup restores the latest row and
//! replays only the log tail recorded after it. Rows accumulate without
//! a retention policy; pruning is an external operational concern.

use chrono::Utc;
use serde_json::Value;
use sqlx::SqlitePool;

use lumina_types::UiState;

use crate::error::DbError;
use crate::sqlite::fmt_ts;

/// Operations on the `snapshots` table.
pub struct SnapshotStore<'a> {
    pool: &'a SqlitePool,
}

impl<'a> SnapshotStore<'a> {
    /// Create a snapshot store bound to a connection pool.
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert one snapshot carrying the serialized state tree.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Sqlite`] if the insert fails.
    pub async fn insert(&self, state: &Value) -> Result<(), DbError> {
        sqlx::query("INSERT INTO snapshots (ts, state) VALUES (?1, ?2)")
            .bind(fmt_ts(Utc::now()))
            .bind(state.to_string())
            .execute(self.pool)
            .await?;

        tracing::debug!("inserted state snapshot");
        Ok(())
    }

    /// Return the most recent snapshot row, if any.
    ///
    /// Rows are ordered by the auto-incremented id, which is monotonic by
    /// insertion time.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Sqlite`] if the query fails.
    pub async fn latest(&self) -> Result<Option<SnapshotRow>, DbError> {
        let row = sqlx::query_as::<_, SnapshotRow>(
            r"SELECT id, ts, state
              FROM snapshots
              ORDER BY id DESC
              LIMIT 1",
        )
        .fetch_optional(self.pool)
        .await?;

        Ok(row)
    }
}

/// A row from the `snapshots` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SnapshotRow {
    /// Auto-incremented snapshot id.
    pub id: i64,
    /// RFC 3339 timestamp text.
    pub ts: String,
    /// Serialized state tree JSON text.
    pub state: String,
}

impl SnapshotRow {
    /// Decode the stored state as raw JSON.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Serialization`] if the column is not valid JSON.
    pub fn state_json(&self) -> Result<Value, DbError> {
        Ok(serde_json::from_str(&self.state)?)
    }

    /// Decode the stored state back into a typed [`UiState`].
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Serialization`] if the column does not match
    /// the state tree shape.
    pub fn ui_state(&self) -> Result<UiState, DbError> {
        Ok(serde_json::from_str(&self.state)?)
    }
}
