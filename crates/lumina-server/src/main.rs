//! Control-plane entry point for the Lumina smart mirror.
//!
//! The process hosts the command arbiter, the HTTP ingress, and the
//! `WebSocket` hub. External producers submit commands over HTTP; the
//! arbiter reduces them against the authoritative state tree, appends
//! events to the local database, and publishes patches on the state bus;
//! the hub relays those patches to every connected UI client.
//!
//! # Architecture
//!
//! ```text
//! HTTP /command --> Arbiter --> UiState
//!                      |          |
//!                      |          +--> snapshots (periodic)
//!                      +--> events (append-only)
//!                      +--> NATS --> Hub --> WebSocket clients
//! ```

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use lumina_arbiter::Arbiter;
use lumina_bus::{NatsBus, PatchPublisher, run_subscriber};
use lumina_db::{SqliteDb, StoreConfig};
use lumina_server::config::ServerConfig;
use lumina_server::snapshot::run_snapshot_task;
use lumina_server::{AppState, BROADCAST_CAPACITY, recovery, start_server};
use lumina_state::StateHandle;

/// Application entry point.
///
/// Initializes logging, loads configuration from environment variables,
/// opens the database, restores the state tree from the latest snapshot,
/// connects the state bus, then serves until `Ctrl-C`.
///
/// # Errors
///
/// Returns an error if initialization or the serve loop fails.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("control plane starting");

    // Load configuration from environment
    let config = ServerConfig::from_env()?;
    info!(
        nats_url = config.nats_url,
        db_path = config.db_path,
        listen_port = config.listen_port,
        snapshot_interval_secs = config.snapshot_interval.as_secs(),
        "configuration loaded"
    );

    // Open the database and ensure the schema
    let db = SqliteDb::connect(&StoreConfig::new(&config.db_path)).await?;
    db.ensure_schema().await?;

    // Restore state from the latest snapshot (defaults otherwise)
    let state = StateHandle::new(recovery::restore_ui_state(&db).await);

    // Connect the patch publisher; the client reconnects on its own, so
    // a broker outage degrades fan-out without stopping arbitration.
    let bus = NatsBus::connect(&config.nats_url, &config.state_subject).await?;
    let publisher: Arc<dyn PatchPublisher> = Arc::new(bus);

    let arbiter = Arc::new(
        Arbiter::new(
            state.clone(),
            db.clone(),
            publisher,
            &config.private_mode_code,
        )
        .await?,
    );

    // Hub fan-out channel, fed by the bus subscriber task.
    let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
    let shutdown = CancellationToken::new();

    let subscriber = tokio::spawn(run_subscriber(
        config.nats_url.clone(),
        config.state_subject.clone(),
        tx.clone(),
        shutdown.clone(),
    ));
    let snapshotter = tokio::spawn(run_snapshot_task(
        state.clone(),
        db.clone(),
        config.snapshot_interval,
        shutdown.clone(),
    ));

    // Ctrl-C unwinds everything through the cancellation token.
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for shutdown signal");
            return;
        }
        info!("shutdown signal received");
        signal_token.cancel();
    });

    let app = Arc::new(AppState::new(arbiter, state, db.clone(), tx));
    let result = start_server(config.listen_port, app, shutdown.clone()).await;

    // Unwind the background tasks even if the server exited on its own.
    shutdown.cancel();
    let _ = subscriber.await;
    let _ = snapshotter.await;
    db.close().await;

    info!("control plane stopped");
    result.map_err(Into::into)
}
