//! Event-log replay onto a state tree.
//!
//! Recovery applies the `state_patch` events recorded after the latest
//! snapshot back onto the restored tree. Patches carry absolute values,
//! so replaying a log prefix is deterministic and idempotent per event.

use serde_json::Value;

use lumina_types::{Event, EventKind, UiState};

use crate::engine;

/// Replay a slice of events (oldest first) onto `state`.
///
/// Non-patch events are skipped, as are patch events whose payload does
/// not carry a usable `path`. Returns the number of patches that took
/// effect.
pub fn replay(state: &mut UiState, events: &[Event]) -> usize {
    let mut applied = 0usize;
    for event in events {
        if event.kind != EventKind::StatePatch {
            continue;
        }
        let Some(path) = event.payload.get("path").and_then(Value::as_str) else {
            continue;
        };
        let value = event
            .payload
            .get("value")
            .cloned()
            .unwrap_or(Value::Null);
        if engine::apply(state, path, &value) {
            applied = applied.saturating_add(1);
        }
    }
    applied
}
