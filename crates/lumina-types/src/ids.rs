//! Type-safe identifier wrappers around [`Uuid`].
//!
//! Commands and events carry distinct strongly-typed IDs to prevent
//! accidental mixing of identifiers at compile time. External producers
//! (voice, gesture, operator UIs) may supply their own command IDs; the
//! `new()` constructors generate one server-side when the wire payload
//! omits it.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new random identifier (UUID v4).
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for a command submitted by a producer.
    CommandId
}

define_id! {
    /// Unique identifier for an event in the event log.
    EventId
}

impl From<CommandId> for EventId {
    /// An event inherits the identifier of the command it arbitrated.
    ///
    /// One command produces exactly one event, so reusing the command ID
    /// keeps the event log idempotent under command re-submission.
    fn from(id: CommandId) -> Self {
        Self(id.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_distinct_types() {
        let command = CommandId::new();
        let event = EventId::new();
        // These are different types -- the compiler enforces no mixing.
        assert_ne!(command.into_inner(), Uuid::nil());
        assert_ne!(event.into_inner(), Uuid::nil());
    }

    #[test]
    fn id_roundtrip_serde() {
        let original = CommandId::new();
        let json = serde_json::to_string(&original).ok();
        assert!(json.is_some());
        let restored: Result<CommandId, _> =
            serde_json::from_str(json.as_deref().unwrap_or(""));
        assert!(restored.is_ok());
    }

    #[test]
    fn event_id_mirrors_command_id() {
        let command = CommandId::new();
        let event = EventId::from(command);
        assert_eq!(event.into_inner(), command.into_inner());
    }
}
