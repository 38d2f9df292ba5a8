//! Command arbitration for the Lumina control plane.
//!
//! The arbiter is the single writer of the authoritative state tree. It
//! reduces each incoming [`Command`](lumina_types::Command) against the
//! closed policy table into exactly one [`Event`](lumina_types::Event)
//! and zero or more [`StatePatch`](lumina_types::StatePatch)es, mutates
//! the tree, appends the event to the log, and publishes the patches to
//! the state bus.
//!
//! # Modules
//!
//! - [`policy`] -- the [`Action`] table and voice-nav canonicalisation
//! - [`arbiter`] -- the [`Arbiter`] reducer itself

pub mod arbiter;
pub mod policy;

// Re-export primary types for convenience.
pub use arbiter::Arbiter;
pub use policy::{Action, canonicalize};
