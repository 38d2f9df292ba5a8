//! The hub-side bus subscription.
//!
//! A single long-running task per process subscribes to the state
//! subject and forwards every decoded patch into the hub's broadcast
//! channel. Any connect or stream failure tears the subscription down
//! and retries after a fixed delay, forever, until shutdown -- missed
//! patches are not replayed; clients that reconnect receive a fresh
//! `initial_state` instead.

use std::time::Duration;

use futures::StreamExt;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use lumina_types::StatePatch;

use crate::error::BusError;

/// Fixed delay between reconnect attempts.
pub const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Decode one bus frame into a [`StatePatch`].
///
/// # Errors
///
/// Returns the underlying JSON error for frames that are not patches
/// (including broker control or ack frames, which subscribers ignore).
pub fn decode_patch(data: &[u8]) -> Result<StatePatch, serde_json::Error> {
    serde_json::from_slice(data)
}

/// Run the subscription loop until `shutdown` is cancelled.
///
/// Every decoded patch is sent into `tx`; an empty receiver set is
/// normal (no hub clients connected). Undecodable frames are skipped
/// with a debug log.
pub async fn run_subscriber(
    url: String,
    subject: String,
    tx: broadcast::Sender<StatePatch>,
    shutdown: CancellationToken,
) {
    loop {
        if shutdown.is_cancelled() {
            info!("state bus subscriber shutting down");
            return;
        }

        match subscribe_once(&url, &subject, &tx, &shutdown).await {
            Ok(()) => {
                // Clean shutdown requested from inside the stream loop.
                info!("state bus subscriber shutting down");
                return;
            }
            Err(e) => {
                warn!(
                    error = %e,
                    retry_in_secs = RECONNECT_DELAY.as_secs(),
                    "state bus subscription failed, will retry"
                );
            }
        }

        tokio::select! {
            () = shutdown.cancelled() => {
                info!("state bus subscriber shutting down");
                return;
            }
            () = tokio::time::sleep(RECONNECT_DELAY) => {}
        }
    }
}

/// One connect-subscribe-stream cycle.
///
/// Returns `Ok(())` only on requested shutdown; every failure mode is an
/// error so the outer loop can back off and retry.
async fn subscribe_once(
    url: &str,
    subject: &str,
    tx: &broadcast::Sender<StatePatch>,
    shutdown: &CancellationToken,
) -> Result<(), BusError> {
    let client = async_nats::connect(url)
        .await
        .map_err(|e| BusError::Nats(format!("failed to connect to {url}: {e}")))?;

    let mut subscription = client
        .subscribe(subject.to_owned())
        .await
        .map_err(|e| BusError::Nats(format!("failed to subscribe to {subject}: {e}")))?;

    info!(subject, "subscribed to state bus");

    loop {
        tokio::select! {
            () = shutdown.cancelled() => {
                let _ = subscription.unsubscribe().await;
                return Ok(());
            }
            message = subscription.next() => {
                match message {
                    Some(message) => match decode_patch(&message.payload) {
                        Ok(patch) => {
                            debug!(path = patch.path, "relaying state patch");
                            let _ = tx.send(patch);
                        }
                        Err(e) => {
                            debug!(error = %e, "skipping undecodable bus frame");
                        }
                    },
                    None => {
                        return Err(BusError::Nats(String::from(
                            "subscription stream ended",
                        )));
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_valid_patch() {
        let frame = br#"{"ts":"2026-08-01T10:00:00Z","path":"/mic_enabled","value":true}"#;
        let result = decode_patch(frame);
        assert!(result.is_ok());
        if let Ok(patch) = result {
            assert_eq!(patch.path, "/mic_enabled");
            assert_eq!(patch.value, serde_json::json!(true));
        }
    }

    #[test]
    fn decode_rejects_control_frames() {
        assert!(decode_patch(b"+OK").is_err());
        assert!(decode_patch(b"{\"type\":\"ack\"}").is_err());
        assert!(decode_patch(b"not json at all").is_err());
    }

    #[tokio::test]
    #[ignore = "requires live NATS server (nats://localhost:4222)"]
    async fn subscriber_unwinds_on_cancel() {
        let (tx, _rx) = broadcast::channel(8);
        let token = CancellationToken::new();
        let handle = tokio::spawn(run_subscriber(
            String::from("nats://localhost:4222"),
            String::from("lumina.state.test"),
            tx,
            token.clone(),
        ));
        token.cancel();
        assert!(handle.await.is_ok());
    }
}
