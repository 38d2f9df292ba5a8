//! Periodic state snapshot task.
//!
//! Every interval the current tree is serialized and appended to the
//! `snapshots` table. Failures are logged and the next tick tries again;
//! a missed snapshot only lengthens the replay window at next startup.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use lumina_db::{SnapshotStore, SqliteDb};
use lumina_state::StateHandle;

/// Run the snapshot loop until `shutdown` is cancelled.
pub async fn run_snapshot_task(
    state: StateHandle,
    db: SqliteDb,
    every: Duration,
    shutdown: CancellationToken,
) {
    info!(every_secs = every.as_secs(), "snapshot task started");
    loop {
        tokio::select! {
            () = shutdown.cancelled() => {
                info!("snapshot task shutting down");
                return;
            }
            () = tokio::time::sleep(every) => {}
        }

        let tree = state.current().await;
        match serde_json::to_value(&tree) {
            Ok(value) => {
                if let Err(e) = SnapshotStore::new(db.pool()).insert(&value).await {
                    warn!(error = %e, "failed to persist snapshot");
                } else {
                    debug!("state snapshot persisted");
                }
            }
            Err(e) => warn!(error = %e, "failed to serialize state for snapshot"),
        }
    }
}
