//! The publisher seam between the arbiter and the broker.
//!
//! The arbiter only ever sees [`PatchPublisher`]; whether patches travel
//! over NATS or stay in-process is a deployment decision. Publishing is
//! fire-and-forget by contract: a broker outage degrades visibility, it
//! never degrades arbitration.

use async_trait::async_trait;
use tokio::sync::broadcast;

use lumina_types::StatePatch;

/// Fan-out sink for state patches.
#[async_trait]
pub trait PatchPublisher: Send + Sync {
    /// Publish one patch to all current subscribers.
    ///
    /// Best effort: implementations log failures and return normally.
    async fn publish(&self, patch: &StatePatch);
}

/// In-process publisher that feeds patches straight into a hub broadcast
/// channel, bypassing the external broker.
///
/// Used when the hub is co-located with the arbiter and no other process
/// subscribes, and by the test suites.
#[derive(Debug, Clone)]
pub struct LoopbackPublisher {
    tx: broadcast::Sender<StatePatch>,
}

impl LoopbackPublisher {
    /// Wrap a hub broadcast sender.
    pub const fn new(tx: broadcast::Sender<StatePatch>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl PatchPublisher for LoopbackPublisher {
    async fn publish(&self, patch: &StatePatch) {
        // send errors only when there are zero receivers, which is normal
        // when no client is connected.
        let _ = self.tx.send(patch.clone());
    }
}
