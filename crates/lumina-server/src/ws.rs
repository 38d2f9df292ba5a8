//! `WebSocket` hub for real-time state patch fan-out.
//!
//! Clients connect to `GET /ws/state`, receive one
//! `{"type":"initial_state","data":{...}}` frame, and from then on every
//! broker-delivered [`StatePatch`] as a raw JSON text frame.
//!
//! Each client owns its task and its own [`broadcast::Receiver`], so one
//! slow or dead client can never block delivery to the rest. A client
//! that lags past the channel capacity, errors on send, or exceeds the
//! per-send deadline is disconnected; it resyncs by reconnecting and
//! receiving a fresh `initial_state`. Patches missed across a broker
//! outage are likewise not replayed.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::state::AppState;

/// Deadline for one frame send to a client.
pub const SEND_TIMEOUT: Duration = Duration::from_secs(5);

/// Upgrade an HTTP request to a `WebSocket` connection and begin
/// streaming state patches.
///
/// # Route
///
/// `GET /ws/state`
pub async fn ws_state(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_ws(socket, state))
}

/// Handle the `WebSocket` lifecycle: initial state frame, then relay
/// every patch until the client disconnects or is evicted.
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
    debug!("WebSocket client connected");

    // Subscribe before snapshotting so no patch between the two is lost.
    let mut rx = state.subscribe();

    let initial = serde_json::json!({
        "type": "initial_state",
        "data": state.state.current().await,
    });
    let Ok(frame) = serde_json::to_string(&initial) else {
        warn!("failed to serialize initial state frame");
        return;
    };
    if send_frame(&mut socket, frame).await.is_err() {
        debug!("WebSocket client disconnected (initial state send failed)");
        return;
    }

    loop {
        tokio::select! {
            // Receive a patch relayed from the state bus.
            result = rx.recv() => {
                match result {
                    Ok(patch) => {
                        let frame = match serde_json::to_string(&patch) {
                            Ok(f) => f,
                            Err(e) => {
                                warn!("failed to serialize state patch: {e}");
                                continue;
                            }
                        };
                        if send_frame(&mut socket, frame).await.is_err() {
                            debug!("WebSocket client evicted (send failed or timed out)");
                            return;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        // A lagging client must not silently desync;
                        // disconnect it so it resyncs via initial_state.
                        warn!(skipped = n, "WebSocket client lagged, disconnecting");
                        return;
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        debug!("patch channel closed, shutting down WebSocket");
                        return;
                    }
                }
            }
            // Check if the client sent a close frame or disconnected.
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => {
                        debug!("WebSocket client disconnected");
                        return;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        let pong = Message::Pong(data);
                        if socket.send(pong).await.is_err() {
                            debug!("WebSocket client disconnected (pong failed)");
                            return;
                        }
                    }
                    Some(Err(e)) => {
                        debug!("WebSocket error: {e}");
                        return;
                    }
                    _ => {
                        // Ignore other message types (text, binary from client).
                    }
                }
            }
        }
    }
}

/// Send one text frame, bounded by [`SEND_TIMEOUT`].
///
/// A timeout counts as a failed send: the caller evicts the client
/// rather than letting one stalled socket back up the relay.
async fn send_frame(socket: &mut WebSocket, frame: String) -> Result<(), ()> {
    match tokio::time::timeout(SEND_TIMEOUT, socket.send(Message::Text(frame.into()))).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(_)) | Err(_) => Err(()),
    }
}
