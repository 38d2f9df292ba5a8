//! HTTP ingress and `WebSocket` hub for the Lumina control plane.
//!
//! This crate assembles the whole serving surface of the arbiter
//! process:
//!
//! - **Ingress** (`/health`, `/state`, `/command`, `/api/v1/state`) --
//!   accepts commands, exposes the live tree and the latest snapshot
//! - **Hub** (`/ws/state`) -- relays every broker-delivered patch to all
//!   connected clients, after an `initial_state` sync frame
//! - **Background tasks** -- the bus subscriber relay and the periodic
//!   snapshot writer
//!
//! # Architecture
//!
//! The hub never reads the broker directly; a single subscriber task per
//! process forwards decoded patches into a broadcast channel, and each
//! client task drains its own receiver. A client that cannot keep up is
//! disconnected rather than allowed to silently fall behind.

pub mod config;
pub mod error;
pub mod handlers;
pub mod recovery;
pub mod router;
pub mod server;
pub mod snapshot;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use config::{ConfigError, ServerConfig};
pub use router::build_router;
pub use server::{ServerError, start_server};
pub use state::{AppState, BROADCAST_CAPACITY};
