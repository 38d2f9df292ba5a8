//! Startup state recovery.
//!
//! The authoritative tree is reconstructed from the latest snapshot when
//! one exists; a missing, unreadable, or corrupt snapshot falls back to
//! defaults rather than refusing to start -- the mirror coming up blank
//! beats the mirror not coming up.

use tracing::{info, warn};

use lumina_db::{SnapshotStore, SqliteDb};
use lumina_types::UiState;

/// Restore the state tree from the latest snapshot, or defaults.
pub async fn restore_ui_state(db: &SqliteDb) -> UiState {
    match SnapshotStore::new(db.pool()).latest().await {
        Ok(Some(row)) => match row.ui_state() {
            Ok(state) => {
                info!(snapshot_id = row.id, "restored state from snapshot");
                state
            }
            Err(e) => {
                warn!(snapshot_id = row.id, error = %e, "latest snapshot is corrupt, starting from defaults");
                UiState::default()
            }
        },
        Ok(None) => {
            info!("no snapshot found, starting from defaults");
            UiState::default()
        }
        Err(e) => {
            warn!(error = %e, "failed to read latest snapshot, starting from defaults");
            UiState::default()
        }
    }
}
