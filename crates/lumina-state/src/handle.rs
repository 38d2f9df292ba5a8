//! Single-owner handle over the authoritative [`UiState`].
//!
//! Exactly one tree exists per arbiter process. All mutation flows
//! through [`StateHandle::apply`] or a write guard obtained from
//! [`StateHandle::write`]; readers receive deep clones and can never
//! mutate the tree behind the owner's back.

use std::sync::Arc;

use tokio::sync::{RwLock, RwLockWriteGuard};
use tracing::debug;

use lumina_types::{StatePatch, UiState};

use crate::engine;

/// Shared, cloneable handle to the authoritative state tree.
#[derive(Debug, Clone)]
pub struct StateHandle {
    inner: Arc<RwLock<UiState>>,
}

impl StateHandle {
    /// Wrap an initial tree (defaults, or a restored snapshot).
    pub fn new(initial: UiState) -> Self {
        Self {
            inner: Arc::new(RwLock::new(initial)),
        }
    }

    /// Return a deep copy of the current tree.
    pub async fn current(&self) -> UiState {
        self.inner.read().await.clone()
    }

    /// Apply one patch under the write lock.
    ///
    /// Returns `true` if the patch took effect. No-op patches are logged
    /// at debug level and otherwise ignored.
    pub async fn apply(&self, patch: &StatePatch) -> bool {
        let mut guard = self.inner.write().await;
        let applied = engine::apply(&mut guard, &patch.path, &patch.value);
        if !applied {
            debug!(path = patch.path, "patch had no effect");
        }
        applied
    }

    /// Acquire the write guard directly.
    ///
    /// The arbiter holds this guard across policy evaluation and patch
    /// application only, so at most one patch is applied at any instant
    /// and no other command can interleave between the two -- and no
    /// disk or broker I/O ever runs behind the lock.
    pub async fn write(&self) -> RwLockWriteGuard<'_, UiState> {
        self.inner.write().await
    }
}

impl Default for StateHandle {
    fn default() -> Self {
        Self::new(UiState::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    #[tokio::test]
    async fn current_returns_a_detached_copy() {
        let handle = StateHandle::default();
        let mut copy = handle.current().await;
        copy.mic_enabled = true;
        // Mutating the copy must not touch the owned tree.
        assert!(!handle.current().await.mic_enabled);
    }

    #[tokio::test]
    async fn apply_mutates_through_the_engine() {
        let handle = StateHandle::default();
        let patch = StatePatch::new(Utc::now(), "/mic_enabled", json!(true));
        assert!(handle.apply(&patch).await);
        assert!(handle.current().await.mic_enabled);
    }

    #[tokio::test]
    async fn noop_patch_reports_false() {
        let handle = StateHandle::default();
        let patch = StatePatch::new(Utc::now(), "/not_a_field", json!(1));
        assert!(!handle.apply(&patch).await);
    }
}
