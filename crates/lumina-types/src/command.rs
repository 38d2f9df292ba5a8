//! Commands submitted by external producers.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;

use crate::ids::CommandId;

/// Where a command originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// The voice interpreter.
    Voice,
    /// The gesture-recognition worker.
    Gesture,
    /// Operator UIs and internal services.
    System,
}

impl Source {
    /// Wire name of the source (matches the serde representation).
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Voice => "voice",
            Self::Gesture => "gesture",
            Self::System => "system",
        }
    }
}

/// An input intent from a producer, immutable once accepted.
///
/// `id` and `ts` are optional on the wire; missing values are generated
/// server-side at deserialization time.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Command {
    /// Unique command identifier (generated if absent).
    #[serde(default)]
    pub id: CommandId,
    /// Submission timestamp (generated if absent).
    #[serde(default = "Utc::now")]
    pub ts: DateTime<Utc>,
    /// Producer that submitted the command.
    pub source: Source,
    /// Key into the arbiter's policy table.
    pub action: String,
    /// Free-form action arguments.
    #[serde(default)]
    pub payload: BTreeMap<String, Value>,
}

impl Command {
    /// Construct a command with a fresh id and timestamp.
    pub fn new(source: Source, action: &str, payload: BTreeMap<String, Value>) -> Self {
        Self {
            id: CommandId::new(),
            ts: Utc::now(),
            source,
            action: action.to_owned(),
            payload,
        }
    }

    /// Look up a string field in the payload.
    pub fn payload_str(&self, key: &str) -> Option<&str> {
        self.payload.get(key).and_then(Value::as_str)
    }

    /// Look up a boolean field in the payload.
    pub fn payload_bool(&self, key: &str) -> Option<bool> {
        self.payload.get(key).and_then(Value::as_bool)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_id_and_ts_are_generated() {
        let json = r#"{"source":"voice","action":"toggle_mic"}"#;
        let parsed: Result<Command, _> = serde_json::from_str(json);
        assert!(parsed.is_ok());
        let cmd =
            parsed.unwrap_or_else(|_| Command::new(Source::Voice, "toggle_mic", BTreeMap::new()));
        assert_eq!(cmd.action, "toggle_mic");
        assert!(cmd.payload.is_empty());
    }

    #[test]
    fn supplied_id_is_preserved() {
        let json = r#"{
            "id": "0192f0c1-2345-4678-9abc-def012345678",
            "ts": "2026-08-01T10:00:00Z",
            "source": "gesture",
            "action": "gesture_palm",
            "payload": {"gesture": "palm"}
        }"#;
        let parsed: Result<Command, _> = serde_json::from_str(json);
        assert!(parsed.is_ok());
        if let Ok(cmd) = parsed {
            assert_eq!(cmd.id.to_string(), "0192f0c1-2345-4678-9abc-def012345678");
            assert_eq!(cmd.payload_str("gesture"), Some("palm"));
        }
    }

    #[test]
    fn missing_source_is_malformed() {
        let json = r#"{"action":"toggle_mic"}"#;
        let parsed: Result<Command, _> = serde_json::from_str(json);
        assert!(parsed.is_err());
    }
}
