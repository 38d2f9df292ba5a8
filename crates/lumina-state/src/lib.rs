//! Authoritative state ownership for the Lumina control plane.
//!
//! The arbiter process holds exactly one [`UiState`](lumina_types::UiState)
//! tree. This crate provides:
//!
//! - [`engine`] -- the JSON-path patch engine (forgiving by contract:
//!   unknown paths are no-ops, never panics)
//! - [`handle`] -- the single-owner [`StateHandle`] wrapper that
//!   serialises all mutation
//! - [`replay`] -- event-log replay used during recovery and by the
//!   replay-equivalence tests

pub mod engine;
pub mod handle;
pub mod replay;

// Re-export primary entry points for convenience.
pub use engine::apply;
pub use handle::StateHandle;
pub use replay::replay;
