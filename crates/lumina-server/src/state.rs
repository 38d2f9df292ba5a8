//! Shared application state for the ingress and hub.
//!
//! [`AppState`] bundles the arbiter, the authoritative state handle, the
//! database, and the broadcast channel the hub fans patches out on. The
//! broadcast sender is fed by the bus subscriber task (or directly by a
//! loopback publisher in single-process deployments).

use std::sync::Arc;

use tokio::sync::broadcast;

use lumina_arbiter::Arbiter;
use lumina_db::SqliteDb;
use lumina_state::StateHandle;
use lumina_types::StatePatch;

/// Capacity of the per-client patch fan-out channel.
///
/// A client that falls behind by more than this many patches is
/// disconnected and expected to resync through a fresh `initial_state`.
pub const BROADCAST_CAPACITY: usize = 256;

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// The command arbiter (single writer of the state tree).
    pub arbiter: Arc<Arbiter>,
    /// Read access to the authoritative state tree.
    pub state: StateHandle,
    /// The event/snapshot database.
    pub db: SqliteDb,
    /// Broadcast sender the hub relays patches from.
    pub tx: broadcast::Sender<StatePatch>,
}

impl AppState {
    /// Assemble the application state.
    pub const fn new(
        arbiter: Arc<Arbiter>,
        state: StateHandle,
        db: SqliteDb,
        tx: broadcast::Sender<StatePatch>,
    ) -> Self {
        Self {
            arbiter,
            state,
            db,
            tx,
        }
    }

    /// Subscribe to the patch fan-out channel.
    pub fn subscribe(&self) -> broadcast::Receiver<StatePatch> {
        self.tx.subscribe()
    }
}
