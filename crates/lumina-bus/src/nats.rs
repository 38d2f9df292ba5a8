//! NATS-backed state bus publisher.
//!
//! The control plane publishes every [`StatePatch`] on a single subject;
//! any number of hubs (co-located or remote) subscribe to it. The client
//! reconnects on its own and buffers briefly while the server is away,
//! so a broker restart costs at most the frames published during the
//! outage -- reconnecting UI clients resync from `initial_state`.

use async_trait::async_trait;
use tracing::{info, warn};

use lumina_types::StatePatch;

use crate::error::BusError;
use crate::publisher::PatchPublisher;

/// Subject the control plane publishes state patches on.
pub const DEFAULT_SUBJECT: &str = "lumina.state";

/// NATS client wrapper for the patch publisher side.
pub struct NatsBus {
    client: async_nats::Client,
    subject: String,
}

impl NatsBus {
    /// Connect to a NATS server.
    ///
    /// Connection establishment retries in the background, so a broker
    /// that is down at startup does not block the arbiter.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::Nats`] if the URL is unusable.
    pub async fn connect(url: &str, subject: &str) -> Result<Self, BusError> {
        info!(url, subject, "connecting to state bus");
        let client = async_nats::ConnectOptions::new()
            .retry_on_initial_connect()
            .connect(url)
            .await
            .map_err(|e| BusError::Nats(format!("failed to connect to {url}: {e}")))?;
        Ok(Self {
            client,
            subject: subject.to_owned(),
        })
    }
}

#[async_trait]
impl PatchPublisher for NatsBus {
    async fn publish(&self, patch: &StatePatch) {
        let payload = match serde_json::to_vec(patch) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(path = patch.path, error = %e, "failed to serialize state patch");
                return;
            }
        };
        if let Err(e) = self.client.publish(self.subject.clone(), payload.into()).await {
            warn!(
                subject = self.subject,
                path = patch.path,
                error = %e,
                "failed to publish state patch"
            );
        }
    }
}

impl std::fmt::Debug for NatsBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NatsBus")
            .field("subject", &self.subject)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    // Integration tests that require a live NATS server are marked #[ignore].

    #[tokio::test]
    #[ignore = "requires live NATS server (nats://localhost:4222)"]
    async fn connect_to_nats() {
        let result = NatsBus::connect("nats://localhost:4222", DEFAULT_SUBJECT).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    #[ignore = "requires live NATS server (nats://localhost:4222)"]
    async fn publish_is_fire_and_forget() {
        let Ok(bus) = NatsBus::connect("nats://localhost:4222", DEFAULT_SUBJECT).await else {
            tracing::error!("NATS connection failed");
            std::process::exit(1);
        };
        let patch = StatePatch::new(Utc::now(), "/mic_enabled", json!(true));
        bus.publish(&patch).await;
    }
}
