//! Embedded `SQLite` connection pool and on-startup schema.
//!
//! The control plane keeps its full history in a single local database
//! file. The schema is created on startup if absent, and the data
//! directory is created if missing, so a fresh deployment needs no
//! provisioning step.
//!
//! Uses [`sqlx`] with runtime query construction (not compile-time
//! checked) so builds never require a live database.

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use crate::error::DbError;

/// Default maximum number of connections in the pool.
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// The magic `SQLite` filename for a process-private in-memory database.
const MEMORY_PATH: &str = ":memory:";

/// DDL executed on every startup. Idempotent by construction.
///
/// `events.seq` is the application order assigned by the arbiter; it is
/// the replay order, while the `ts` index only serves time-window
/// queries.
const SCHEMA: [&str; 6] = [
    "CREATE TABLE IF NOT EXISTS events (
        id TEXT PRIMARY KEY,
        seq INTEGER NOT NULL,
        ts TEXT NOT NULL,
        commandId TEXT NOT NULL,
        type TEXT NOT NULL,
        payload TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS snapshots (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        ts TEXT NOT NULL,
        state TEXT NOT NULL
    )",
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_events_seq ON events(seq)",
    "CREATE INDEX IF NOT EXISTS idx_events_ts ON events(ts)",
    "CREATE INDEX IF NOT EXISTS idx_events_commandId ON events(commandId)",
    "CREATE INDEX IF NOT EXISTS idx_snapshots_ts ON snapshots(ts)",
];

/// Configuration for the embedded database.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Path to the database file.
    pub path: String,
    /// Maximum number of connections in the pool.
    pub max_connections: u32,
}

impl StoreConfig {
    /// Create a configuration for a file-backed database.
    pub fn new(path: &str) -> Self {
        Self {
            path: path.to_owned(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }

    /// Create a configuration for a process-private in-memory database.
    ///
    /// The pool is capped at a single connection: each `SQLite` in-memory
    /// connection is its own database, so a wider pool would silently
    /// split the data.
    pub fn in_memory() -> Self {
        Self {
            path: String::from(MEMORY_PATH),
            max_connections: 1,
        }
    }

    /// Set the maximum number of connections.
    #[must_use]
    pub const fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }
}

/// Connection pool handle to the embedded database.
#[derive(Debug, Clone)]
pub struct SqliteDb {
    pool: SqlitePool,
}

impl SqliteDb {
    /// Open (creating if missing) the database described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Io`] if the data directory cannot be created,
    /// or [`DbError::Sqlite`] if the pool cannot be established.
    pub async fn connect(config: &StoreConfig) -> Result<Self, DbError> {
        if config.path != MEMORY_PATH
            && let Some(parent) = Path::new(&config.path).parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        let options = SqliteConnectOptions::new()
            .filename(&config.path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await?;

        tracing::info!(path = config.path, "opened control-plane database");
        Ok(Self { pool })
    }

    /// Create the tables and indexes if they do not exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Sqlite`] if any DDL statement fails.
    pub async fn ensure_schema(&self) -> Result<(), DbError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        tracing::info!("database schema ensured");
        Ok(())
    }

    /// Return a reference to the underlying [`SqlitePool`].
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close all connections in the pool gracefully.
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("database pool closed");
    }
}

/// Format a timestamp for the `ts` columns.
///
/// Fixed-width UTC RFC 3339 with microseconds, so lexicographic ordering
/// of the column equals chronological ordering.
pub(crate) fn fmt_ts(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}
