//! Persistence layer for the Lumina control plane (embedded `SQLite`).
//!
//! Two tables back the whole system: `events` is the append-only record
//! of every arbitrated command, `snapshots` holds periodic full copies of
//! the state tree for cheap recovery. Both live in one local database
//! file created on first startup.
//!
//! Persistence is deliberately subordinate to availability: a failed
//! write is logged by the caller and arbitration continues. A mirror that
//! keeps responding beats a mirror that blocks on disk.
//!
//! # Modules
//!
//! - [`sqlite`] -- connection pool, data directory, on-startup schema
//! - [`event_store`] -- idempotent append and log-tail queries
//! - [`snapshot_store`] -- snapshot insert and latest-row lookup
//! - [`error`] -- shared error types

pub mod error;
pub mod event_store;
pub mod snapshot_store;
pub mod sqlite;

// Re-export primary types for convenience.
pub use error::DbError;
pub use event_store::{EventRow, EventStore};
pub use snapshot_store::{SnapshotRow, SnapshotStore};
pub use sqlite::{SqliteDb, StoreConfig};
