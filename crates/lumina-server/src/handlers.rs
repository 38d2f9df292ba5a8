//! REST endpoint handlers for the control plane.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/health` | Liveness probe |
//! | `GET` | `/state` | Live authoritative state tree |
//! | `POST` | `/command` | Submit one command for arbitration |
//! | `GET` | `/api/v1/state` | State as of the latest snapshot |
//!
//! Malformed command JSON is answered 4xx by the extractor before any
//! handler runs; syntactically valid commands always arbitrate to a 200
//! (including `rejected` outcomes).

use std::sync::Arc;
use std::time::Duration;

use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;

use lumina_db::SnapshotStore;
use lumina_types::Command;

use crate::error::ApiError;
use crate::state::AppState;

/// Upper bound on one arbitration from the ingress point of view.
///
/// Arbitration is in-memory plus one local insert, so hitting this
/// means something downstream is badly wedged; the producer gets a 5xx
/// rather than an open-ended stall.
pub const COMMAND_TIMEOUT: Duration = Duration::from_secs(5);

/// Liveness probe.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "control-plane",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Return the live authoritative state tree.
///
/// Clients use this for initial sync; the live head streams over the
/// WebSocket.
pub async fn get_state(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.state.current().await)
}

/// Accept one command, arbitrate it, and report the resulting event.
pub async fn post_command(
    State(state): State<Arc<AppState>>,
    Json(cmd): Json<Command>,
) -> Result<impl IntoResponse, ApiError> {
    match tokio::time::timeout(COMMAND_TIMEOUT, state.arbiter.handle(cmd)).await {
        Ok(event) => Ok(Json(serde_json::json!({
            "status": event.kind.as_str(),
            "payload": event.payload,
            "event_id": event.id,
        }))),
        Err(elapsed) => Err(ApiError::Timeout(format!(
            "arbitration did not complete: {elapsed}"
        ))),
    }
}

/// Return the state tree as of the latest snapshot.
///
/// A coarse read for clients that do not need the live head. Responds
/// 404 until the first snapshot has been recorded.
pub async fn latest_snapshot(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let row = SnapshotStore::new(state.db.pool())
        .latest()
        .await?
        .ok_or_else(|| ApiError::NotFound(String::from("no snapshot recorded yet")))?;

    Ok(Json(row.state_json()?))
}
