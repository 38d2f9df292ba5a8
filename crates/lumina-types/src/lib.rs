//! Shared type definitions for the Lumina control plane.
//!
//! This crate is the single source of truth for the wire and state types
//! used across the workspace. Types defined here flow downstream to
//! `TypeScript` via `ts-rs` for the mirror frontend.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for commands and events
//! - [`command`] -- Producer input intents
//! - [`event`] -- Arbitration outcomes
//! - [`patch`] -- State patches broadcast to subscribers
//! - [`apps`] -- The canonical app registry and visibility rules
//! - [`state`] -- The authoritative UI state tree

pub mod apps;
pub mod command;
pub mod event;
pub mod ids;
pub mod patch;
pub mod state;

// Re-export all public types at crate root for convenience.
pub use apps::{APP_REGISTRY, AppRoute, PrivacyMode, next_app, prev_app, visible_apps};
pub use command::{Command, Source};
pub use event::{Event, EventKind};
pub use ids::{CommandId, EventId};
pub use patch::StatePatch;
pub use state::{DebugState, HudState, TodoItem, UiShell, UiState};
