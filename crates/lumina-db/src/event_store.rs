//! Append-only event log operations.
//!
//! Events are the audit trail of every arbitrated command. The log is
//! insert-only; rows are never updated or deleted. Append is idempotent
//! on the event id so a re-submitted command cannot duplicate history.
//!
//! Every row carries a `seq` number assigned by the arbiter at the
//! moment its patches are applied. Command timestamps are stamped at
//! ingress, before commands queue for the state write lock, so under
//! concurrent submission `ts` order and application order can disagree;
//! `seq` is the canonical order, and replaying the log by `seq` is what
//! reproduces the running tree. The `ts` index remains for time-window
//! queries only.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use lumina_types::{Event, EventKind};

use crate::error::DbError;
use crate::sqlite::fmt_ts;

/// Operations on the `events` table.
pub struct EventStore<'a> {
    pool: &'a SqlitePool,
}

impl<'a> EventStore<'a> {
    /// Create an event store bound to a connection pool.
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Append one event to the log at application position `seq`.
    ///
    /// A duplicate event id is a no-op, logged at debug level; the row
    /// keeps the `seq` of its first application. Callers treat append
    /// failures as degraded mode: arbitration continues and the failure
    /// is logged, never surfaced to the producer.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Sqlite`] if the insert fails.
    pub async fn append(&self, seq: i64, event: &Event) -> Result<(), DbError> {
        let result = sqlx::query(
            r"INSERT OR IGNORE INTO events (id, seq, ts, commandId, type, payload)
              VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(event.id.to_string())
        .bind(seq)
        .bind(fmt_ts(event.ts))
        .bind(event.command_id.to_string())
        .bind(event.kind.as_str())
        .bind(event.payload.to_string())
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            tracing::debug!(id = %event.id, "duplicate event id, append skipped");
        }
        Ok(())
    }

    /// Query all events strictly after `since`, in application order.
    ///
    /// Used by recovery to replay the log tail recorded after the latest
    /// snapshot. Rows are ordered by `seq`, not `ts`: replaying in
    /// timestamp order would diverge from the running tree whenever a
    /// later-stamped command won the write lock first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Sqlite`] if the query fails, or
    /// [`DbError::Decode`] if a stored row cannot be decoded.
    pub async fn events_since(&self, since: DateTime<Utc>) -> Result<Vec<Event>, DbError> {
        let rows = sqlx::query_as::<_, EventRow>(
            r"SELECT id, ts, commandId, type, payload
              FROM events
              WHERE ts > ?1
              ORDER BY seq",
        )
        .bind(fmt_ts(since))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(EventRow::into_event).collect()
    }

    /// The highest application sequence number in the log, or 0 when the
    /// log is empty.
    ///
    /// The arbiter continues numbering from here on startup.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Sqlite`] if the query fails.
    pub async fn max_seq(&self) -> Result<i64, DbError> {
        let max: i64 = sqlx::query_scalar("SELECT COALESCE(MAX(seq), 0) FROM events")
            .fetch_one(self.pool)
            .await?;
        Ok(max)
    }

    /// Count all rows in the log.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Sqlite`] if the query fails.
    pub async fn count(&self) -> Result<i64, DbError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM events")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}

/// A raw row from the `events` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EventRow {
    /// Event id (UUID text).
    pub id: String,
    /// RFC 3339 timestamp text.
    pub ts: String,
    /// Originating command id (UUID text).
    #[sqlx(rename = "commandId")]
    pub command_id: String,
    /// Outcome class (`accepted`, `rejected`, `state_patch`).
    #[sqlx(rename = "type")]
    pub kind: String,
    /// Event payload JSON text.
    pub payload: String,
}

impl EventRow {
    /// Decode the raw row back into a typed [`Event`].
    fn into_event(self) -> Result<Event, DbError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| DbError::Decode(format!("event id {}: {e}", self.id)))?;
        let command_id = Uuid::parse_str(&self.command_id)
            .map_err(|e| DbError::Decode(format!("command id {}: {e}", self.command_id)))?;
        let ts = DateTime::parse_from_rfc3339(&self.ts)
            .map_err(|e| DbError::Decode(format!("event ts {}: {e}", self.ts)))?
            .with_timezone(&Utc);
        let kind = EventKind::parse(&self.kind)
            .ok_or_else(|| DbError::Decode(format!("unknown event type {}", self.kind)))?;
        let payload = serde_json::from_str(&self.payload)?;

        Ok(Event {
            id: id.into(),
            ts,
            command_id: command_id.into(),
            kind,
            payload,
        })
    }
}
