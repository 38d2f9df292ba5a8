//! State patches broadcast to subscribed UI clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;

/// A single self-describing mutation to the UI state tree.
///
/// Applying the same patch to the same prior state always yields the same
/// next state; the value carries the absolute result, never a delta.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct StatePatch {
    /// Timestamp of the command that produced the patch.
    pub ts: DateTime<Utc>,
    /// Slash-separated path into the state tree, e.g. `/todos/+`.
    pub path: String,
    /// The value to assign (or append, for `+` paths).
    pub value: Value,
}

impl StatePatch {
    /// Construct a patch.
    pub fn new(ts: DateTime<Utc>, path: &str, value: Value) -> Self {
        Self {
            ts,
            path: path.to_owned(),
            value,
        }
    }
}
