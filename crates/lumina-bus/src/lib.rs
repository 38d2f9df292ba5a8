//! State-patch pub/sub for the Lumina control plane.
//!
//! The arbiter and the hub are decoupled by a broker: the arbiter
//! publishes every [`StatePatch`](lumina_types::StatePatch) on one
//! subject, hubs subscribe and fan frames out to their WebSocket
//! clients. Delivery is at-most-once to currently-subscribed consumers;
//! reconnecting clients resync via the hub's `initial_state` frame.
//!
//! # Modules
//!
//! - [`publisher`] -- the [`PatchPublisher`] seam and the in-process
//!   loopback implementation
//! - [`nats`] -- the NATS-backed publisher
//! - [`subscriber`] -- the reconnecting subscription task
//! - [`error`] -- shared error types

pub mod error;
pub mod nats;
pub mod publisher;
pub mod subscriber;

// Re-export primary types for convenience.
pub use error::BusError;
pub use nats::{DEFAULT_SUBJECT, NatsBus};
pub use publisher::{LoopbackPublisher, PatchPublisher};
pub use subscriber::{RECONNECT_DELAY, decode_patch, run_subscriber};
