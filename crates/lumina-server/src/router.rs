//! Axum router construction for the control plane.
//!
//! Assembles the ingress REST routes and the `WebSocket` hub into a
//! single [`Router`] with CORS enabled for the mirror frontend.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router for the control plane.
///
/// The router includes:
/// - `GET /health` -- liveness probe
/// - `GET /state` -- live authoritative state tree
/// - `POST /command` -- command ingress
/// - `GET /api/v1/state` -- latest snapshot view
/// - `GET /ws/state` -- `WebSocket` patch stream
///
/// CORS is configured to allow any origin; the mirror frontend is served
/// from a different port on the same device.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Ingress
        .route("/health", get(handlers::health))
        .route("/state", get(handlers::get_state))
        .route("/command", post(handlers::post_command))
        .route("/api/v1/state", get(handlers::latest_snapshot))
        // Hub
        .route("/ws/state", get(ws::ws_state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
