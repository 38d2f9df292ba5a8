//! Events recorded by the arbiter for every processed command.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use ts_rs::TS;

use crate::command::Command;
use crate::ids::{CommandId, EventId};
use crate::patch::StatePatch;

/// The outcome class of an arbitrated command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// The command was acknowledged without touching state.
    Accepted,
    /// The command was refused by policy.
    Rejected,
    /// The command produced a state patch.
    StatePatch,
}

impl EventKind {
    /// Wire name of the kind (matches the serde representation and the
    /// `type` column of the event log).
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::StatePatch => "state_patch",
        }
    }

    /// Parse a wire name back into a kind.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "accepted" => Some(Self::Accepted),
            "rejected" => Some(Self::Rejected),
            "state_patch" => Some(Self::StatePatch),
            _ => None,
        }
    }
}

/// The arbiter's immutable record of what happened for one command.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Event {
    /// Event identifier; mirrors the command id so re-submitted commands
    /// dedupe in the append-only log.
    pub id: EventId,
    /// Timestamp of the originating command.
    pub ts: DateTime<Utc>,
    /// The command this event arbitrates.
    #[serde(rename = "commandId")]
    pub command_id: CommandId,
    /// Outcome class.
    #[serde(rename = "type")]
    pub kind: EventKind,
    /// Outcome detail: the patch for `state_patch`, a reason for
    /// `rejected`, an echo of the action for `accepted`.
    pub payload: Value,
}

impl Event {
    /// Record that `cmd` was acknowledged without a state change.
    pub fn accepted(cmd: &Command, payload: Value) -> Self {
        Self::build(cmd, EventKind::Accepted, payload)
    }

    /// Record that `cmd` was refused, with a machine-readable reason.
    pub fn rejected(cmd: &Command, reason: &str) -> Self {
        Self::build(
            cmd,
            EventKind::Rejected,
            json!({ "reason": reason, "action": cmd.action }),
        )
    }

    /// Record that `cmd` produced `patch`.
    pub fn state_patch(cmd: &Command, patch: &StatePatch) -> Self {
        let payload = serde_json::to_value(patch).unwrap_or(Value::Null);
        Self::build(cmd, EventKind::StatePatch, payload)
    }

    fn build(cmd: &Command, kind: EventKind, payload: Value) -> Self {
        Self {
            id: EventId::from(cmd.id),
            ts: cmd.ts,
            command_id: cmd.id,
            kind,
            payload,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Source;

    #[test]
    fn kind_names_roundtrip() {
        for kind in [EventKind::Accepted, EventKind::Rejected, EventKind::StatePatch] {
            assert_eq!(EventKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(EventKind::parse("exploded"), None);
    }

    #[test]
    fn event_inherits_command_identity() {
        let cmd = Command::new(Source::System, "system.toggleDebug", std::collections::BTreeMap::new());
        let event = Event::rejected(&cmd, "unknown_action");
        assert_eq!(event.command_id, cmd.id);
        assert_eq!(event.id.into_inner(), cmd.id.into_inner());
        assert_eq!(event.ts, cmd.ts);
    }

    #[test]
    fn kind_serializes_snake_case() {
        let value = serde_json::to_value(EventKind::StatePatch).unwrap_or(Value::Null);
        assert_eq!(value, json!("state_patch"));
    }
}
