//! End-to-end tests for the `WebSocket` hub over real sockets.
//!
//! The server is bound to an ephemeral local port and driven with
//! `tokio-tungstenite` clients, validating the initial-state frame, the
//! patch fan-out, and that one dead client never affects the rest.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::missing_panics_doc)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use serde_json::{Value, json};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tokio_util::sync::CancellationToken;

use lumina_arbiter::Arbiter;
use lumina_bus::{LoopbackPublisher, PatchPublisher};
use lumina_db::{SqliteDb, StoreConfig};
use lumina_server::{AppState, BROADCAST_CAPACITY, build_router};
use lumina_state::StateHandle;
use lumina_types::{Command, Source};

type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Time budget for every expected frame.
const RECV_TIMEOUT: Duration = Duration::from_secs(5);

async fn spawn_app() -> (Arc<AppState>, SocketAddr, CancellationToken) {
    let db = SqliteDb::connect(&StoreConfig::in_memory())
        .await
        .expect("failed to open in-memory database");
    db.ensure_schema().await.expect("failed to ensure schema");

    let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
    let state = StateHandle::default();
    let publisher: Arc<dyn PatchPublisher> = Arc::new(LoopbackPublisher::new(tx.clone()));
    let arbiter = Arc::new(
        Arbiter::new(state.clone(), db.clone(), publisher, "unlock")
            .await
            .expect("failed to assemble arbiter"),
    );
    let app = Arc::new(AppState::new(arbiter, state, db, tx));

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind test listener");
    let addr = listener.local_addr().expect("no local addr");

    let token = CancellationToken::new();
    let serve_token = token.clone();
    let router = build_router(Arc::clone(&app));
    tokio::spawn(async move {
        let _ = axum::serve(listener, router)
            .with_graceful_shutdown(serve_token.cancelled_owned())
            .await;
    });

    (app, addr, token)
}

async fn connect(addr: SocketAddr) -> WsClient {
    let (client, _) = connect_async(format!("ws://{addr}/ws/state"))
        .await
        .expect("WebSocket connect failed");
    client
}

/// Read frames until the next text frame, decoded as JSON.
async fn next_json(client: &mut WsClient) -> Value {
    loop {
        let message = tokio::time::timeout(RECV_TIMEOUT, client.next())
            .await
            .expect("timed out waiting for frame")
            .expect("stream ended")
            .expect("stream errored");
        if let Message::Text(text) = message {
            return serde_json::from_str(&text).expect("frame is not JSON");
        }
    }
}

fn command(source: Source, action: &str, payload: Value) -> Command {
    let map = payload
        .as_object()
        .map(|fields| fields.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
        .unwrap_or_default();
    Command::new(source, action, map)
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_initial_state_frame_on_connect() {
    let (_app, addr, token) = spawn_app().await;

    let mut client = connect(addr).await;
    let frame = next_json(&mut client).await;
    assert_eq!(frame["type"], "initial_state");
    assert_eq!(frame["data"]["ui"]["appRoute"], "home");
    assert_eq!(frame["data"]["mode"], "idle");

    token.cancel();
}

#[tokio::test]
async fn test_fanout_survives_a_dead_client() {
    let (app, addr, token) = spawn_app().await;

    let mut first = connect(addr).await;
    let mut second = connect(addr).await;
    assert_eq!(next_json(&mut first).await["type"], "initial_state");
    assert_eq!(next_json(&mut second).await["type"], "initial_state");

    // Both connected clients receive the identical patch frame.
    app.arbiter
        .handle(command(Source::Voice, "add_todo", json!({"text": "Buy milk"})))
        .await;
    let patch_first = next_json(&mut first).await;
    let patch_second = next_json(&mut second).await;
    assert_eq!(patch_first["path"], "/todos/+");
    assert_eq!(patch_first["value"]["text"], "Buy milk");
    assert_eq!(patch_first, patch_second);

    // Kill one client; the survivor keeps receiving patches.
    drop(second);
    app.arbiter
        .handle(command(Source::Gesture, "toggle_mic", json!({})))
        .await;
    let patch = next_json(&mut first).await;
    assert_eq!(patch["path"], "/mic_enabled");
    assert_eq!(patch["value"], true);

    token.cancel();
}

#[tokio::test]
async fn test_reconnecting_client_resyncs_from_initial_state() {
    let (app, addr, token) = spawn_app().await;

    app.arbiter
        .handle(command(Source::Voice, "add_todo", json!({"text": "Water plants"})))
        .await;
    app.arbiter
        .handle(command(Source::Gesture, "toggle_mic", json!({})))
        .await;

    // A client connecting after the fact sees the accumulated state, not
    // the individual patches it missed.
    let mut late = connect(addr).await;
    let frame = next_json(&mut late).await;
    assert_eq!(frame["type"], "initial_state");
    assert_eq!(frame["data"]["todos"][0]["text"], "Water plants");
    assert_eq!(frame["data"]["mic_enabled"], true);

    token.cancel();
}

#[tokio::test]
async fn test_two_patch_transition_arrives_in_order() {
    let (app, addr, token) = spawn_app().await;

    app.arbiter
        .handle(command(
            Source::System,
            "system.setMode",
            json!({"mode": "private", "code": "unlock"}),
        ))
        .await;
    app.arbiter
        .handle(command(Source::Voice, "voice.openApp", json!({"app": "email"})))
        .await;

    let mut client = connect(addr).await;
    assert_eq!(next_json(&mut client).await["type"], "initial_state");

    app.arbiter
        .handle(command(Source::Voice, "system.setMode", json!({"mode": "public"})))
        .await;

    // Home patch strictly before the mode patch.
    let first = next_json(&mut client).await;
    let second = next_json(&mut client).await;
    assert_eq!(first["path"], "/ui/appRoute");
    assert_eq!(first["value"], "home");
    assert_eq!(second["path"], "/ui/mode");
    assert_eq!(second["value"], "public");

    token.cancel();
}
